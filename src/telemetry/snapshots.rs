// ABOUTME: Snapshot persistence for the telemetry store
// ABOUTME: Restores at start-up, saves periodically from a background task and once more at shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::TelemetryService;
use crate::errors::{AppError, AppResult};
use crate::tasks::BackgroundTask;
use lifestyle_series::SnapshotFile;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{info, warn};

/// Writes and restores snapshots of one telemetry store
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    service: TelemetryService,
    file: Arc<SnapshotFile>,
}

impl SnapshotWriter {
    /// Writer for `service` backed by `file`
    #[must_use]
    pub fn new(service: TelemetryService, file: SnapshotFile) -> Self {
        Self {
            service,
            file: Arc::new(file),
        }
    }

    /// Snapshot file location
    #[must_use]
    pub fn file(&self) -> &SnapshotFile {
        &self.file
    }

    /// Export the store and write it to disk. Returns bytes written.
    ///
    /// Works after the store is closed so shutdown can persist its final state.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the store cannot be exported or the
    /// file cannot be written. In-memory state is never affected.
    pub async fn save(&self) -> AppResult<usize> {
        let store = Arc::clone(&self.service.store);
        let file = Arc::clone(&self.file);
        let started = Instant::now();

        let (series, bytes) = task::spawn_blocking(move || -> AppResult<(usize, usize)> {
            let snapshot = store.export()?;
            let bytes = file.save(&snapshot)?;
            Ok((snapshot.series.len(), bytes))
        })
        .await
        .map_err(|e| AppError::internal(format!("Snapshot task failed: {e}")))??;

        info!(
            path = %self.file.path().display(),
            series,
            bytes,
            duration_ms = started.elapsed().as_millis(),
            "Telemetry snapshot saved"
        );
        Ok(bytes)
    }

    /// Load the snapshot file into the store. Returns series restored.
    ///
    /// A missing file restores nothing and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the file is unreadable, corrupt or of
    /// an unsupported version, or when the store is closed.
    pub async fn restore(&self) -> AppResult<usize> {
        let store = Arc::clone(&self.service.store);
        let file = Arc::clone(&self.file);

        let restored = task::spawn_blocking(move || -> AppResult<(usize, usize)> {
            let Some(snapshot) = file.load()? else {
                return Ok((0, 0));
            };
            let samples = snapshot.sample_count();
            Ok((store.restore(snapshot)?, samples))
        })
        .await
        .map_err(|e| AppError::internal(format!("Snapshot task failed: {e}")))??;

        let (series, samples) = restored;
        if series > 0 {
            info!(
                path = %self.file.path().display(),
                series,
                samples,
                "Telemetry snapshot restored"
            );
        }
        Ok(series)
    }

    /// Save every `period` until the returned task is shut down
    #[must_use]
    pub fn spawn_periodic(self, period: Duration) -> BackgroundTask {
        BackgroundTask::spawn_interval("telemetry-snapshot", period, move || {
            let writer = self.clone();
            async move {
                if let Err(e) = writer.save().await {
                    warn!(error = %e, "Periodic telemetry snapshot failed");
                }
            }
        })
    }
}
