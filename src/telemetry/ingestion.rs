// ABOUTME: Ingestion gateway for batched sensor samples
// ABOUTME: Validates metric and batch shape, then applies the batch to one series atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::telemetry::MAX_METRIC_NAME_LENGTH;
use crate::errors::{AppError, AppResult};
use lifestyle_series::{Sample, SampleStore, SeriesKey};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One batch of samples for a single metric
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    /// Metric name as submitted
    pub metric: String,
    /// Decoded samples in arrival order
    pub samples: Vec<Sample>,
    /// Entries dropped before decoding into a [`Sample`]
    pub malformed: usize,
}

impl IngestBatch {
    /// Batch with no undecodable entries
    #[must_use]
    pub fn new(metric: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            metric: metric.into(),
            samples,
            malformed: 0,
        }
    }

    /// Number of entries the caller submitted
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.samples.len() + self.malformed
    }
}

/// Outcome of an ingested batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestReport {
    /// Samples written (distinct timestamps)
    pub accepted: usize,
    /// Entries dropped as malformed
    pub rejected: usize,
    /// Oldest samples evicted by retention
    pub evicted: usize,
    /// Samples held by the series afterwards
    pub retained: usize,
}

/// Trimmed metric name, or `InvalidInput`
///
/// # Errors
///
/// Returns an error when the metric is blank or longer than the allowed length
pub fn validate_metric(metric: &str) -> AppResult<&str> {
    let trimmed = metric.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("metric must not be empty"));
    }
    if trimmed.chars().count() > MAX_METRIC_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "metric must be at most {MAX_METRIC_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

/// Write path into the sample store
#[derive(Debug, Clone)]
pub struct IngestionGateway {
    store: Arc<SampleStore>,
}

impl IngestionGateway {
    /// Gateway over `store`
    #[must_use]
    pub const fn new(store: Arc<SampleStore>) -> Self {
        Self { store }
    }

    /// Validate a batch without touching the store, returning the trimmed metric
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank or oversized metric or an empty batch
    pub fn validate(batch: &IngestBatch) -> AppResult<&str> {
        let metric = validate_metric(&batch.metric)?;
        if batch.submitted() == 0 {
            return Err(AppError::invalid_input("samples must not be empty"));
        }
        Ok(metric)
    }

    /// Apply a batch to the caller's series
    ///
    /// Blocks on the series writer lock; run it off the async executor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when validation fails (nothing is written) or
    /// `StoreUnavailable` when the store cannot apply the batch.
    pub fn ingest(&self, owner: Uuid, batch: IngestBatch) -> AppResult<IngestReport> {
        let key = SeriesKey::new(owner, Self::validate(&batch)?);

        let submitted = batch.submitted();
        let valid = batch.samples.iter().filter(|s| s.is_valid()).count();
        let outcome = self.store.apply(&key, batch.samples)?;

        Ok(IngestReport {
            accepted: outcome.written,
            rejected: submitted - valid,
            evicted: outcome.evicted,
            retained: outcome.retained,
        })
    }
}
