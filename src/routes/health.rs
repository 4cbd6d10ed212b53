// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and store-aware readiness endpoints for load balancers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring
//!
//! `/api/health` only says the process answers. `/api/ready` also asks the
//! sample store for its counters and fails with 503 once the store is closed.

use crate::constants::routes;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({
                "status": "ok",
                "timestamp": Utc::now().to_rfc3339()
            }))
        }

        async fn ready_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Result<Json<Value>, AppError> {
            let stats = resources.telemetry.stats().await?;
            Ok(Json(json!({
                "status": "ready",
                "timestamp": Utc::now().to_rfc3339(),
                "series": stats.series,
                "samples": stats.samples
            })))
        }

        Router::new()
            .route(routes::HEALTH, get(health_handler))
            .route(routes::READY, get(ready_handler))
            .with_state(resources)
    }
}
