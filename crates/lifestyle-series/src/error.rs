// ABOUTME: Error type for the series engine
// ABOUTME: Converts engine failures into AppError codes understood by the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use lifestyle_core::errors::AppError;
use std::io;

/// Series engine errors
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// A point budget of zero was requested
    #[error("maxPoints must be at least 1")]
    InvalidPointBudget,

    /// Downsampling method name not recognised
    #[error("Unknown downsampling method: {0}")]
    UnknownMethod(String),

    /// Store no longer accepts calls
    #[error("Sample store is closed")]
    Closed,

    /// A series lock was poisoned by a panicking writer
    #[error("Lock poisoned for series {0}")]
    LockPoisoned(String),

    /// Reading or writing the snapshot file failed
    #[error("Snapshot I/O failed while {context}: {source}")]
    Io {
        /// Step that failed
        context: &'static str,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Snapshot contents could not be decoded
    #[error("Snapshot is unreadable: {0}")]
    Snapshot(String),
}

impl From<SeriesError> for AppError {
    fn from(error: SeriesError) -> Self {
        match error {
            SeriesError::InvalidPointBudget | SeriesError::UnknownMethod(_) => {
                Self::invalid_input(error.to_string())
            }
            SeriesError::Closed | SeriesError::LockPoisoned(_) => {
                Self::store_unavailable(error.to_string())
            }
            SeriesError::Io { .. } | SeriesError::Snapshot(_) => {
                Self::store_unavailable(error.to_string()).with_source(error)
            }
        }
    }
}
