// ABOUTME: Main library entry point for the Lifestyle streams telemetry service
// ABOUTME: Sensor sample ingestion and time-windowed downsampling behind an authenticated HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Lifestyle Streams
//!
//! Telemetry subsystem of the Lifestyle coaching dashboard. Wearables and the
//! mobile client push batches of timestamped samples (heart rate, cadence,
//! skin temperature, ...) per user and metric; the dashboard reads arbitrary
//! time ranges reduced to a point budget it can plot.
//!
//! ## Architecture
//!
//! - **telemetry**: ingestion gateway, range query engine, and the `TelemetryService` façade
//! - **auth** / **permissions**: bearer token verification, revocation, and coach access policy
//! - **routes** / **middleware**: the axum HTTP surface
//! - **server**: router assembly, background tasks, and graceful shutdown
//! - **config** / **logging**: environment configuration and structured logging
//!
//! Storage and downsampling live in the `lifestyle-series` crate; shared error
//! types and constants in `lifestyle-core`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lifestyle_streams::config::environment::ServerConfig;
//! use lifestyle_streams::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Lifestyle streams configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Bearer token authentication and revocation
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (authentication, CORS, request tracing)
pub mod middleware;

/// Cross-user access policy
pub mod permissions;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Server assembly and runtime
pub mod server;

/// Background task handles
pub mod tasks;

/// Telemetry ingestion and query services
pub mod telemetry;
