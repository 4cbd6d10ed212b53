// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, server resources with a fixed secret, tokens and sample builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `lifestyle_streams`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use axum::Router;
use lifestyle_series::{Sample, SampleStore, StoreConfig};
use lifestyle_streams::{
    config::ServerConfig,
    permissions::CoachRoster,
    resources::{ServerResources, ServerResourcesBuilder},
    server::build_router,
    telemetry::{IngestBatch, TelemetryLimits, TelemetryService},
};
use std::sync::{Arc, Once};
use std::time::Duration;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Signing secret shared by every test server
pub const TEST_JWT_SECRET: &str = "lifestyle-streams-test-secret";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG raises the level when debugging a failing test
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Configuration with a fixed secret and test-sized limits
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = Some(TEST_JWT_SECRET.to_owned());
    config.telemetry.request_timeout = Duration::from_secs(2);
    config.telemetry.default_max_points = 500;
    config.telemetry.max_points_limit = 1_000;
    config
}

/// A test server: shared resources plus the roster that governs cross-user reads
pub struct TestServer {
    /// Resources behind the router
    pub resources: Arc<ServerResources>,
    /// Coach links consulted by the access policy
    pub roster: Arc<CoachRoster>,
}

impl TestServer {
    /// Server over `test_config()`
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Server over a specific configuration
    pub fn with_config(config: ServerConfig) -> Self {
        init_test_logging();
        let roster = Arc::new(CoachRoster::new());
        let resources = ServerResourcesBuilder::new(config)
            .with_access_policy(roster.clone())
            .build();
        Self {
            resources: Arc::new(resources),
            roster,
        }
    }

    /// Full router with the production middleware stack
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.resources))
    }

    /// Session token for a user
    pub fn token(&self, user_id: Uuid) -> String {
        self.resources
            .auth_manager
            .generate_token(user_id)
            .expect("Failed to generate token")
    }

    /// Telemetry facade behind the router
    pub fn telemetry(&self) -> &TelemetryService {
        &self.resources.telemetry
    }
}

/// Telemetry facade over a fresh store
pub fn create_test_telemetry(retention_capacity: usize) -> TelemetryService {
    init_test_logging();
    let store = SampleStore::new(StoreConfig { retention_capacity });
    TelemetryService::new(Arc::new(store), TelemetryLimits::default())
}

/// `count` samples one second apart starting at `start`, valued by index
pub fn samples_every_second(start: i64, count: usize) -> Vec<Sample> {
    (0..i64::try_from(count).unwrap())
        .map(|i| Sample::new(start + i * 1_000, i as f64))
        .collect()
}

/// Batch for a metric
pub fn batch(metric: &str, samples: Vec<Sample>) -> IngestBatch {
    IngestBatch::new(metric, samples)
}
