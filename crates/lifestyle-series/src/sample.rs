// ABOUTME: Sample and series identity types
// ABOUTME: A sample is a millisecond timestamp plus a finite value; a series is keyed by owner and metric
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single timestamped reading
///
/// Serialized as `{"ts": <ms since epoch>, "value": <number>}`, the shape used for
/// query responses and snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    #[serde(rename = "ts")]
    pub timestamp: i64,
    /// Measured value
    pub value: f64,
}

impl Sample {
    /// Create a sample
    #[must_use]
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// A sample is storable when its timestamp is non-negative and its value finite
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.timestamp >= 0 && self.value.is_finite()
    }
}

/// Identity of a series: whose data and which metric
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    /// User the samples belong to
    pub owner: Uuid,
    /// Metric name, already trimmed
    pub metric: String,
}

impl SeriesKey {
    /// Create a series key
    #[must_use]
    pub fn new(owner: Uuid, metric: impl Into<String>) -> Self {
        Self {
            owner,
            metric: metric.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.metric)
    }
}
