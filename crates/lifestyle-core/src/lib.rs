// ABOUTME: Core types and constants for the Lifestyle streams telemetry service
// ABOUTME: Foundation crate with error handling and application-wide constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Lifestyle Core
//!
//! Foundation crate providing shared types and constants for the Lifestyle streams
//! service. It changes rarely so the series engine and the server crate can build
//! against it incrementally.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and the HTTP error envelope
//! - **constants**: Application-wide constants organized by domain

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration defaults organized by domain
pub mod constants;
