// ABOUTME: Telemetry service facade over the ingestion gateway and range query engine
// ABOUTME: Runs store work on the blocking pool under a caller deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Telemetry
//!
//! [`TelemetryService`] is the only entry point routes use. It never checks
//! access: the owner it receives has already been resolved by
//! [`crate::permissions::resolve_owner`] or is the caller itself.
//!
//! Every store call runs through [`TelemetryService::with_deadline`]. When the
//! deadline passes the caller gets `Timeout`, while the blocking task carries
//! on and its batch still lands entirely or not at all.

/// Batch validation and the write path
pub mod ingestion;
/// Window resolution and downsampling
pub mod query;
/// Snapshot persistence and its background task
pub mod snapshots;

pub use ingestion::{validate_metric, IngestBatch, IngestReport, IngestionGateway};
pub use query::{QueryResult, RangeQuery, RangeQueryEngine};
pub use snapshots::SnapshotWriter;

use crate::config::TelemetryConfig;
use crate::constants::telemetry::{
    DEFAULT_MAX_POINTS, DEFAULT_MAX_POINTS_LIMIT, DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use lifestyle_series::{SampleStore, SeriesSummary, StoreConfig, StoreStats};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{task, time};
use tracing::warn;
use uuid::Uuid;

/// Request limits applied by the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryLimits {
    /// Deadline for a single ingest or query
    pub request_timeout: Duration,
    /// Point budget when the caller gives none
    pub default_max_points: usize,
    /// Largest point budget a caller may ask for
    pub max_points_limit: usize,
}

impl Default for TelemetryLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            default_max_points: DEFAULT_MAX_POINTS,
            max_points_limit: DEFAULT_MAX_POINTS_LIMIT,
        }
    }
}

impl From<&TelemetryConfig> for TelemetryLimits {
    fn from(config: &TelemetryConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            default_max_points: config.default_max_points,
            max_points_limit: config.max_points_limit,
        }
    }
}

/// Telemetry facade shared by every request
#[derive(Debug, Clone)]
pub struct TelemetryService {
    store: Arc<SampleStore>,
    gateway: IngestionGateway,
    engine: RangeQueryEngine,
    limits: TelemetryLimits,
}

impl TelemetryService {
    /// Facade over an existing store
    #[must_use]
    pub fn new(store: Arc<SampleStore>, limits: TelemetryLimits) -> Self {
        Self {
            gateway: IngestionGateway::new(Arc::clone(&store)),
            engine: RangeQueryEngine::new(Arc::clone(&store)),
            store,
            limits,
        }
    }

    /// Facade over a fresh store sized from configuration
    #[must_use]
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let store = SampleStore::new(StoreConfig {
            retention_capacity: config.retention_capacity,
        });
        Self::new(Arc::new(store), TelemetryLimits::from(config))
    }

    /// Limits in force
    #[must_use]
    pub const fn limits(&self) -> TelemetryLimits {
        self.limits
    }

    /// Whether the underlying store still serves calls
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.store.is_open()
    }

    /// Close the store; later calls fail with `StoreUnavailable`
    pub fn close(&self) {
        self.store.close();
    }

    /// Effective point budget for an optional caller value
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for zero and `ValueOutOfRange` above the configured limit
    pub fn max_points(&self, requested: Option<usize>) -> AppResult<usize> {
        let max_points = requested.unwrap_or(self.limits.default_max_points);
        if max_points == 0 {
            return Err(AppError::invalid_input("maxPoints must be at least 1"));
        }
        if max_points > self.limits.max_points_limit {
            return Err(AppError::out_of_range(format!(
                "maxPoints must be at most {}",
                self.limits.max_points_limit
            )));
        }
        Ok(max_points)
    }

    /// Ingest a batch into the owner's series under the default deadline
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `StoreUnavailable` or `Timeout`
    pub async fn ingest(&self, owner: Uuid, batch: IngestBatch) -> AppResult<IngestReport> {
        self.ingest_with_deadline(owner, batch, self.limits.request_timeout)
            .await
    }

    /// Ingest a batch under an explicit deadline
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `StoreUnavailable` or `Timeout`
    pub async fn ingest_with_deadline(
        &self,
        owner: Uuid,
        batch: IngestBatch,
        deadline: Duration,
    ) -> AppResult<IngestReport> {
        let metric = IngestionGateway::validate(&batch)?.to_owned();

        let gateway = self.gateway.clone();
        let report =
            Self::with_deadline("ingest", deadline, move || gateway.ingest(owner, batch)).await?;

        AppLogger::log_ingest(owner, &metric, report.accepted, report.rejected, report.evicted);
        Ok(report)
    }

    /// Resolve and downsample a window under the default deadline
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `ValueOutOfRange`, `StoreUnavailable` or `Timeout`
    pub async fn query(&self, owner: Uuid, query: RangeQuery) -> AppResult<QueryResult> {
        self.query_with_deadline(owner, query, self.limits.request_timeout)
            .await
    }

    /// Resolve and downsample a window under an explicit deadline
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `ValueOutOfRange`, `StoreUnavailable` or `Timeout`
    pub async fn query_with_deadline(
        &self,
        owner: Uuid,
        query: RangeQuery,
        deadline: Duration,
    ) -> AppResult<QueryResult> {
        let max_points = self.max_points(query.max_points)?;
        validate_metric(&query.metric)?;
        RangeQueryEngine::validate_window(query.from, query.to)?;

        let started = Instant::now();
        let engine = self.engine.clone();
        let result =
            Self::with_deadline("query", deadline, move || engine.run(owner, &query, max_points))
                .await?;

        AppLogger::log_query(
            owner,
            &result.metric,
            result.total,
            result.points.len(),
            started.elapsed().as_millis(),
        );
        Ok(result)
    }

    /// Summaries of every series the owner has
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` or `Timeout`
    pub async fn list_metrics(&self, owner: Uuid) -> AppResult<Vec<SeriesSummary>> {
        let store = Arc::clone(&self.store);
        Self::with_deadline("list_metrics", self.limits.request_timeout, move || {
            Ok(store.summaries(owner)?)
        })
        .await
    }

    /// Drop every series of an owner (account deletion)
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` or `Timeout`
    pub async fn purge_owner(&self, owner: Uuid) -> AppResult<usize> {
        let store = Arc::clone(&self.store);
        let removed = Self::with_deadline("purge_owner", self.limits.request_timeout, move || {
            Ok(store.purge_owner(owner)?)
        })
        .await?;

        tracing::info!(user.id = %owner, series = removed, "Purged telemetry for owner");
        Ok(removed)
    }

    /// Store-wide counters
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` or `Timeout`
    pub async fn stats(&self) -> AppResult<StoreStats> {
        let store = Arc::clone(&self.store);
        Self::with_deadline("stats", self.limits.request_timeout, move || {
            Ok(store.stats()?)
        })
        .await
    }

    /// Run blocking store work on the blocking pool, bounded by `deadline`
    ///
    /// # Errors
    ///
    /// Returns the work's own error, `Timeout` when the deadline passes, or
    /// `Internal` if the blocking task panicked.
    pub async fn with_deadline<T, F>(
        operation: &'static str,
        deadline: Duration,
        work: F,
    ) -> AppResult<T>
    where
        F: FnOnce() -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        match time::timeout(deadline, task::spawn_blocking(work)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AppError::internal(format!(
                "{operation} task failed: {join_error}"
            ))),
            Err(_) => {
                let elapsed_ms = started.elapsed().as_millis();
                warn!(
                    operation,
                    elapsed_ms,
                    deadline_ms = deadline.as_millis(),
                    "Telemetry operation exceeded its deadline"
                );
                Err(AppError::timeout(operation, elapsed_ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use lifestyle_series::Sample;

    fn service() -> TelemetryService {
        TelemetryService::new(Arc::new(SampleStore::default()), TelemetryLimits::default())
    }

    #[test]
    fn test_max_points_bounds() {
        let service = service();
        assert_eq!(service.max_points(None).unwrap(), DEFAULT_MAX_POINTS);
        assert_eq!(service.max_points(Some(1)).unwrap(), 1);
        assert_eq!(
            service.max_points(Some(0)).unwrap_err().code,
            ErrorCode::InvalidInput
        );
        assert_eq!(
            service
                .max_points(Some(DEFAULT_MAX_POINTS_LIMIT + 1))
                .unwrap_err()
                .code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[tokio::test]
    async fn test_ingest_then_query() {
        let service = service();
        let owner = Uuid::new_v4();
        let samples = (0..10).map(|i| Sample::new(i * 1_000, 60.0)).collect();

        let report = service
            .ingest(owner, IngestBatch::new("heart_rate", samples))
            .await
            .unwrap();
        assert_eq!(report.accepted, 10);

        let result = service
            .query(owner, RangeQuery::new("heart_rate", 2_000, 4_000))
            .await
            .unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.points.len(), 3);
    }

    #[tokio::test]
    async fn test_validation_happens_before_store() {
        let service = service();
        service.close();

        // Closed store would answer StoreUnavailable; bad input never gets that far
        let err = service
            .ingest(Uuid::new_v4(), IngestBatch::new("", vec![Sample::new(1, 1.0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = service
            .query(Uuid::new_v4(), RangeQuery::new("hr", 10, 5))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = service
            .query(Uuid::new_v4(), RangeQuery::new("hr", 0, 5))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_with_deadline_maps_panics_to_internal() {
        let err = TelemetryService::with_deadline::<(), _>("explode", Duration::from_secs(5), || {
            panic!("boom")
        })
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
