// ABOUTME: Route module organization for the lifestyle streams HTTP endpoints
// ABOUTME: Groups route definitions by domain with thin handlers over the service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the streams service
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the telemetry service.

/// Health check and readiness routes
pub mod health;
/// Sensor telemetry ingestion and query routes
pub mod streams;

/// Health check route handlers
pub use health::HealthRoutes;
/// Streams route handlers
pub use streams::StreamsRoutes;
