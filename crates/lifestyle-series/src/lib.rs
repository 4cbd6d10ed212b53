// ABOUTME: Time-series engine for timestamped sensor samples
// ABOUTME: Exposes the sample model, series store, downsampler, and snapshot persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Lifestyle Series
//!
//! In-memory storage and reduction of numeric sensor streams. A series is
//! identified by its owner and metric name and always holds samples sorted by
//! strictly increasing timestamp, capped at a retention capacity.
//!
//! ## Modules
//!
//! - **sample**: `Sample` and `SeriesKey`
//! - **series**: batch normalization, ordered merge, retention and range slicing
//! - **store**: `SampleStore`, the concurrent per-series store
//! - **downsample**: point-budget reduction (`lttb`, `mean`, `max`)
//! - **persistence**: snapshot files used to survive restarts
//! - **error**: `SeriesError` and its mapping onto `AppError`

/// Engine error type
pub mod error;

/// Sample and series identity types
pub mod sample;

/// Sorted series operations
pub mod series;

/// Concurrent sample store
pub mod store;

/// Point-budget reduction
pub mod downsample;

/// Snapshot persistence
pub mod persistence;

pub use downsample::{reduce, DownsampleMethod};
pub use error::SeriesError;
pub use persistence::{PersistedSeries, SnapshotFile, StoreSnapshot};
pub use sample::{Sample, SeriesKey};
pub use series::SeriesSnapshot;
pub use store::{ApplyOutcome, SampleStore, SeriesSummary, StoreConfig, StoreStats};
