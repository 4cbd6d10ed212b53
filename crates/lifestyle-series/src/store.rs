// ABOUTME: Concurrent per-series sample store with bounded retention
// ABOUTME: Writers merge off to the side and publish a new snapshot; readers never see partial batches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sample Store
//!
//! Series live in a `DashMap` keyed by [`SeriesKey`]. Each series slot has a
//! writer mutex that serializes batches for that series and a published
//! [`SeriesSnapshot`] behind an `RwLock`. A writer builds the merged vector
//! while holding only the writer mutex, then swaps the published snapshot in
//! one short write lock. Readers clone the snapshot `Arc` and release the lock
//! immediately, so a query always observes a batch entirely or not at all.
//!
//! Different series never contend beyond the map shard lookup.

use crate::error::SeriesError;
use crate::persistence::{PersistedSeries, StoreSnapshot};
use crate::sample::{Sample, SeriesKey};
use crate::series::{self, SeriesSnapshot};
use dashmap::DashMap;
use lifestyle_core::constants::telemetry::DEFAULT_RETENTION_CAPACITY;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Store configuration
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Maximum samples kept per series; older samples are evicted first
    pub retention_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention_capacity: DEFAULT_RETENTION_CAPACITY,
        }
    }
}

/// Result of applying one batch to one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// Distinct timestamps written by the batch
    pub written: usize,
    /// Oldest samples dropped to respect the retention capacity
    pub evicted: usize,
    /// Samples held by the series after the batch
    pub retained: usize,
}

/// Per-series summary returned by [`SampleStore::summaries`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Metric name
    pub metric: String,
    /// Samples currently held
    pub samples: usize,
    /// Oldest retained timestamp
    pub first_ts: i64,
    /// Newest retained timestamp
    pub last_ts: i64,
}

/// Whole-store counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    /// Non-empty series
    pub series: usize,
    /// Samples across all series
    pub samples: usize,
}

#[derive(Debug, Default)]
struct SeriesSlot {
    writer: Mutex<()>,
    published: RwLock<SeriesSnapshot>,
}

impl SeriesSlot {
    fn read(&self, key: &SeriesKey) -> Result<SeriesSnapshot, SeriesError> {
        self.published
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SeriesError::LockPoisoned(key.to_string()))
    }

    fn publish(&self, key: &SeriesKey, snapshot: SeriesSnapshot) -> Result<(), SeriesError> {
        let mut guard = self
            .published
            .write()
            .map_err(|_| SeriesError::LockPoisoned(key.to_string()))?;
        *guard = snapshot;
        Ok(())
    }
}

/// Concurrent store of capacity-bounded series
#[derive(Debug)]
pub struct SampleStore {
    series: DashMap<SeriesKey, Arc<SeriesSlot>>,
    retention_capacity: usize,
    open: AtomicBool,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl SampleStore {
    /// Create an empty store. A zero capacity is raised to one.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            series: DashMap::new(),
            retention_capacity: config.retention_capacity.max(1),
            open: AtomicBool::new(true),
        }
    }

    /// Per-series retention capacity
    #[must_use]
    pub const fn retention_capacity(&self) -> usize {
        self.retention_capacity
    }

    /// Whether the store still serves calls
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Stop serving calls. Every later call fails with [`SeriesError::Closed`].
    pub fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            debug!("Sample store closed");
        }
    }

    fn ensure_open(&self) -> Result<(), SeriesError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SeriesError::Closed)
        }
    }

    fn slot(&self, key: &SeriesKey) -> Arc<SeriesSlot> {
        if let Some(slot) = self.series.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.series.entry(key.clone()).or_default().value())
    }

    /// Apply a batch to one series
    ///
    /// The batch may be in any order and may repeat timestamps; the last
    /// occurrence of a timestamp wins, and incoming values replace stored ones
    /// at the same timestamp. Samples with a negative timestamp or a
    /// non-finite value are ignored. A batch with nothing valid leaves the
    /// store untouched and does not create the series.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`] after [`close`](Self::close), or
    /// [`SeriesError::LockPoisoned`] if a previous writer for the series panicked.
    pub fn apply(&self, key: &SeriesKey, batch: Vec<Sample>) -> Result<ApplyOutcome, SeriesError> {
        self.ensure_open()?;

        let incoming = series::normalize_batch(batch);
        if incoming.is_empty() {
            return Ok(ApplyOutcome::default());
        }

        let slot = self.slot(key);
        let _writer = slot
            .writer
            .lock()
            .map_err(|_| SeriesError::LockPoisoned(key.to_string()))?;

        let current = slot.read(key)?;
        let mut merged = series::merge_sorted(current.as_slice(), &incoming);
        let evicted = series::enforce_capacity(&mut merged, self.retention_capacity);
        let retained = merged.len();
        slot.publish(key, SeriesSnapshot::from_sorted(merged))?;

        if evicted > 0 {
            debug!(series = %key, evicted, retained, "Retention capacity reached");
        }

        Ok(ApplyOutcome {
            written: incoming.len(),
            evicted,
            retained,
        })
    }

    /// Current published snapshot of a series, `None` if it was never written
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`] or [`SeriesError::LockPoisoned`].
    pub fn snapshot(&self, key: &SeriesKey) -> Result<Option<SeriesSnapshot>, SeriesError> {
        self.ensure_open()?;
        let Some(slot) = self.series.get(key).map(|entry| Arc::clone(entry.value())) else {
            return Ok(None);
        };
        slot.read(key).map(Some)
    }

    /// Summaries of every non-empty series owned by `owner`, sorted by metric
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`] or [`SeriesError::LockPoisoned`].
    pub fn summaries(&self, owner: Uuid) -> Result<Vec<SeriesSummary>, SeriesError> {
        self.ensure_open()?;
        let mut summaries = Vec::new();
        for (key, snapshot) in self.collect_snapshots(|key| key.owner == owner)? {
            if let (Some(first), Some(last)) = (snapshot.first(), snapshot.last()) {
                summaries.push(SeriesSummary {
                    metric: key.metric,
                    samples: snapshot.len(),
                    first_ts: first.timestamp,
                    last_ts: last.timestamp,
                });
            }
        }
        summaries.sort_by(|a, b| a.metric.cmp(&b.metric));
        Ok(summaries)
    }

    /// Remove every series owned by `owner`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`].
    pub fn purge_owner(&self, owner: Uuid) -> Result<usize, SeriesError> {
        self.ensure_open()?;
        let mut removed = 0;
        self.series.retain(|key, _| {
            let keep = key.owner != owner;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    /// Counters across the whole store
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`] or [`SeriesError::LockPoisoned`].
    pub fn stats(&self) -> Result<StoreStats, SeriesError> {
        self.ensure_open()?;
        let mut stats = StoreStats::default();
        for (_, snapshot) in self.collect_snapshots(|_| true)? {
            if !snapshot.is_empty() {
                stats.series += 1;
                stats.samples += snapshot.len();
            }
        }
        Ok(stats)
    }

    /// Copy every non-empty series into a serializable snapshot
    ///
    /// Works while the store is closed so shutdown can persist the final state.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::LockPoisoned`].
    pub fn export(&self) -> Result<StoreSnapshot, SeriesError> {
        let mut persisted: Vec<PersistedSeries> = self
            .collect_snapshots(|_| true)?
            .into_iter()
            .filter(|(_, snapshot)| !snapshot.is_empty())
            .map(|(key, snapshot)| PersistedSeries {
                owner: key.owner,
                metric: key.metric,
                samples: snapshot.as_slice().to_vec(),
            })
            .collect();
        persisted.sort_by(|a, b| (a.owner, &a.metric).cmp(&(b.owner, &b.metric)));
        Ok(StoreSnapshot::new(persisted))
    }

    /// Replace the contents of the named series with the snapshot's samples
    ///
    /// Samples are re-normalized and trimmed to the current retention
    /// capacity, so a snapshot taken under a larger capacity still loads.
    /// Returns the number of series restored.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Closed`] or [`SeriesError::LockPoisoned`].
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<usize, SeriesError> {
        self.ensure_open()?;
        let mut restored = 0;
        for persisted in snapshot.series {
            let metric = persisted.metric.trim();
            if metric.is_empty() {
                warn!(owner = %persisted.owner, "Skipping snapshot series with empty metric");
                continue;
            }
            let key = SeriesKey::new(persisted.owner, metric);
            let mut samples = series::normalize_batch(persisted.samples);
            series::enforce_capacity(&mut samples, self.retention_capacity);
            if samples.is_empty() {
                continue;
            }

            let slot = self.slot(&key);
            let _writer = slot
                .writer
                .lock()
                .map_err(|_| SeriesError::LockPoisoned(key.to_string()))?;
            slot.publish(&key, SeriesSnapshot::from_sorted(samples))?;
            restored += 1;
        }
        Ok(restored)
    }

    fn collect_snapshots(
        &self,
        filter: impl Fn(&SeriesKey) -> bool,
    ) -> Result<Vec<(SeriesKey, SeriesSnapshot)>, SeriesError> {
        let slots: Vec<(SeriesKey, Arc<SeriesSlot>)> = self
            .series
            .iter()
            .filter(|entry| filter(entry.key()))
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        slots
            .into_iter()
            .map(|(key, slot)| {
                let snapshot = slot.read(&key)?;
                Ok((key, snapshot))
            })
            .collect()
    }
}
