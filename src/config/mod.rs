// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven settings for networking, auth, and the telemetry engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Lifestyle streams server
//!
//! Configuration is environment-only; see [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, Environment, HttpConfig, ServerConfig, TelemetryConfig,
};
