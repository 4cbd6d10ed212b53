// ABOUTME: HTTP middleware for request tracing, authentication, and CORS
// ABOUTME: Provides request ID propagation, bearer token extraction, and span creation for structured logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bearer token extraction and authentication
pub mod auth;
/// Cross-origin resource sharing layer
pub mod cors;
/// Request IDs and tracing spans
pub mod tracing;

// Authentication
pub use auth::{authenticate_request, bearer_token};

// CORS configuration
pub use cors::setup_cors;

// Request tracing and context management
pub use tracing::{create_request_span, request_id_middleware, RequestContext};
