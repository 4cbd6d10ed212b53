// ABOUTME: HTTP server assembly and runtime lifecycle
// ABOUTME: Builds the axum router, runs background tasks, and shuts down gracefully with a final snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server
//!
//! Start-up order: restore the snapshot (if configured), start the periodic
//! snapshot and revocation purge tasks, then serve. On SIGTERM or SIGINT the
//! listener stops accepting, in-flight requests drain, background tasks stop,
//! the store is closed and one last snapshot is written.

use crate::config::ServerConfig;
use crate::middleware::{create_request_span, request_id_middleware, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{HealthRoutes, StreamsRoutes};
use crate::tasks::BackgroundTask;
use crate::telemetry::SnapshotWriter;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use lifestyle_series::SnapshotFile;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Build the application router with its middleware stack
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let body_limit = resources.config.http.body_limit_bytes;
    // Backstop above the per-operation deadline so handlers answer 504 first
    let outer_timeout = resources.config.telemetry.request_timeout * 2;

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(StreamsRoutes::routes(Arc::clone(&resources)))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(outer_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
        .layer(setup_cors(&resources.config.cors))
}

/// Background work owned by a running server
struct RuntimeTasks {
    tasks: Vec<BackgroundTask>,
    snapshots: Option<SnapshotWriter>,
}

impl RuntimeTasks {
    /// Restore the snapshot and start periodic work
    async fn start(resources: &ServerResources) -> Result<Self> {
        let telemetry_config = &resources.config.telemetry;
        let mut tasks = Vec::new();

        let snapshots = match &telemetry_config.snapshot_path {
            Some(path) => {
                let writer =
                    SnapshotWriter::new(resources.telemetry.clone(), SnapshotFile::new(path));
                let restored = writer.restore().await.with_context(|| {
                    format!("Failed to restore telemetry snapshot {}", path.display())
                })?;
                info!(series = restored, path = %path.display(), "Telemetry store restored");
                tasks.push(
                    writer
                        .clone()
                        .spawn_periodic(telemetry_config.snapshot_interval),
                );
                Some(writer)
            }
            None => {
                info!("Snapshot persistence disabled; telemetry is memory only");
                None
            }
        };

        let revocations = Arc::clone(&resources.revocations);
        tasks.push(BackgroundTask::spawn_interval(
            "revocation-purge",
            resources.config.auth.revocation_purge_interval,
            move || {
                let revocations = Arc::clone(&revocations);
                async move {
                    let purged = revocations.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = revocations.len(), "Purged expired revocations");
                    }
                }
            },
        ));

        Ok(Self { tasks, snapshots })
    }

    /// Stop periodic work, close the store and write the final snapshot
    async fn stop(self, resources: &ServerResources) {
        for task in self.tasks {
            let name = task.name();
            task.shutdown().await;
            debug!(task = name, "Background task stopped");
        }

        resources.telemetry.close();

        if let Some(writer) = self.snapshots {
            if let Err(e) = writer.save().await {
                error!(error = %e, "Final telemetry snapshot failed");
            }
        }
    }
}

/// Serve on an already bound listener until `shutdown` completes
///
/// # Errors
///
/// Returns an error if the snapshot cannot be restored or the server fails
pub async fn serve<F>(
    listener: TcpListener,
    resources: Arc<ServerResources>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let runtime = RuntimeTasks::start(&resources).await?;
    let app = build_router(Arc::clone(&resources));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed");

    info!("HTTP server stopped, finishing background work");
    runtime.stop(&resources).await;
    served
}

/// Load resources for `config`, bind and serve until SIGTERM or SIGINT
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound, the snapshot cannot be restored or the server fails
pub async fn run(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let addr = format!("{}:{}", config.host, config.http_port);
    let resources = Arc::new(ServerResources::new(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Lifestyle streams listening on http://{addr}");

    serve(listener, resources, shutdown_signal()).await
}

/// Completes on SIGTERM or SIGINT
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Failed to register signal handlers, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

/// Completes on Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
