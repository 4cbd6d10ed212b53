// ABOUTME: Range query engine over published series snapshots
// ABOUTME: Resolves inclusive time windows and downsamples them to the requested point budget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ingestion::validate_metric;
use crate::errors::{AppError, AppResult};
use lifestyle_series::{reduce, DownsampleMethod, Sample, SampleStore, SeriesKey};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Time window and reduction requested by a caller
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    /// Metric name
    pub metric: String,
    /// Inclusive lower bound, epoch millis
    pub from: i64,
    /// Inclusive upper bound, epoch millis
    pub to: i64,
    /// Point budget, the configured default when `None`
    pub max_points: Option<usize>,
    /// Bucket reduction strategy
    pub method: DownsampleMethod,
}

impl RangeQuery {
    /// Query with the default budget and method
    #[must_use]
    pub fn new(metric: impl Into<String>, from: i64, to: i64) -> Self {
        Self {
            metric: metric.into(),
            from,
            to,
            max_points: None,
            method: DownsampleMethod::default(),
        }
    }

    /// Set the point budget
    #[must_use]
    pub const fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = Some(max_points);
        self
    }

    /// Set the reduction method
    #[must_use]
    pub const fn with_method(mut self, method: DownsampleMethod) -> Self {
        self.method = method;
        self
    }
}

/// Downsampled window returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Metric name
    pub metric: String,
    /// Samples in the window before downsampling
    pub total: usize,
    /// Downsampled samples, oldest first
    pub points: Vec<Sample>,
}

/// Read path from the sample store
#[derive(Debug, Clone)]
pub struct RangeQueryEngine {
    store: Arc<SampleStore>,
}

impl RangeQueryEngine {
    /// Engine over `store`
    #[must_use]
    pub const fn new(store: Arc<SampleStore>) -> Self {
        Self { store }
    }

    /// Check window bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for negative bounds or `from > to`
    pub fn validate_window(from: i64, to: i64) -> AppResult<()> {
        if from < 0 || to < 0 {
            return Err(AppError::invalid_input(
                "from and to must be non-negative epoch milliseconds",
            ));
        }
        if from > to {
            return Err(AppError::invalid_input(format!(
                "from ({from}) must not be after to ({to})"
            )));
        }
        Ok(())
    }

    /// Samples of one series in `[from, to]`, ascending
    ///
    /// A series that was never written resolves to an empty window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad metric or window and
    /// `StoreUnavailable` when the store cannot be read.
    pub fn resolve(&self, owner: Uuid, metric: &str, from: i64, to: i64) -> AppResult<Vec<Sample>> {
        let metric = validate_metric(metric)?;
        Self::validate_window(from, to)?;

        let key = SeriesKey::new(owner, metric);
        Ok(self
            .store
            .snapshot(&key)?
            .map(|snapshot| snapshot.range(from, to).to_vec())
            .unwrap_or_default())
    }

    /// Resolve and downsample a query with an already bounded point budget
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve), plus `InvalidInput` for a zero budget.
    pub fn run(&self, owner: Uuid, query: &RangeQuery, max_points: usize) -> AppResult<QueryResult> {
        if max_points == 0 {
            return Err(AppError::invalid_input("maxPoints must be at least 1"));
        }
        let metric = validate_metric(&query.metric)?;
        Self::validate_window(query.from, query.to)?;

        let key = SeriesKey::new(owner, metric);
        let Some(snapshot) = self.store.snapshot(&key)? else {
            return Ok(QueryResult {
                metric: metric.to_owned(),
                total: 0,
                points: Vec::new(),
            });
        };

        let window = snapshot.range(query.from, query.to);
        Ok(QueryResult {
            metric: metric.to_owned(),
            total: window.len(),
            points: reduce(window, max_points, query.method)?,
        })
    }
}
