// ABOUTME: Sorted series operations: batch normalization, ordered merge, retention, range slicing
// ABOUTME: SeriesSnapshot is the immutable published view readers work from
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Every function here works on slices that are sorted by strictly increasing
//! timestamp. `normalize_batch` is the only entry point that accepts arbitrary
//! order and establishes that invariant.

use crate::sample::Sample;
use std::cmp::Ordering;
use std::sync::Arc;

/// Sort a batch by timestamp and collapse duplicates, keeping the value that
/// arrived last for each timestamp. Invalid samples are discarded.
#[must_use]
pub fn normalize_batch(batch: impl IntoIterator<Item = Sample>) -> Vec<Sample> {
    let mut samples: Vec<Sample> = batch.into_iter().filter(Sample::is_valid).collect();
    // Stable: equal timestamps keep arrival order, so the later one is seen last below
    samples.sort_by_key(|sample| sample.timestamp);

    let mut normalized: Vec<Sample> = Vec::with_capacity(samples.len());
    for sample in samples {
        match normalized.last_mut() {
            Some(last) if last.timestamp == sample.timestamp => *last = sample,
            _ => normalized.push(sample),
        }
    }
    normalized
}

/// Merge a normalized batch into an existing series. On equal timestamps the
/// incoming value replaces the stored one.
#[must_use]
pub fn merge_sorted(existing: &[Sample], incoming: &[Sample]) -> Vec<Sample> {
    match (existing.last(), incoming.first()) {
        (None, _) => return incoming.to_vec(),
        (_, None) => return existing.to_vec(),
        (Some(last), Some(first)) if first.timestamp > last.timestamp => {
            let mut merged = Vec::with_capacity(existing.len() + incoming.len());
            merged.extend_from_slice(existing);
            merged.extend_from_slice(incoming);
            return merged;
        }
        _ => {}
    }

    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let (mut i, mut j) = (0, 0);
    while i < existing.len() && j < incoming.len() {
        let (old, new) = (existing[i], incoming[j]);
        match old.timestamp.cmp(&new.timestamp) {
            Ordering::Less => {
                merged.push(old);
                i += 1;
            }
            Ordering::Greater => {
                merged.push(new);
                j += 1;
            }
            Ordering::Equal => {
                merged.push(new);
                i += 1;
                j += 1;
            }
        }
    }
    merged.extend_from_slice(&existing[i..]);
    merged.extend_from_slice(&incoming[j..]);
    merged
}

/// Drop the oldest samples until at most `capacity` remain. Returns how many were evicted.
pub fn enforce_capacity(samples: &mut Vec<Sample>, capacity: usize) -> usize {
    let excess = samples.len().saturating_sub(capacity);
    if excess > 0 {
        samples.drain(..excess);
    }
    excess
}

/// Samples whose timestamp lies in `[from, to]`
#[must_use]
pub fn range(samples: &[Sample], from: i64, to: i64) -> &[Sample] {
    if from > to {
        return &[];
    }
    let start = samples.partition_point(|sample| sample.timestamp < from);
    let end = samples.partition_point(|sample| sample.timestamp <= to);
    &samples[start..end.max(start)]
}

/// Immutable view of a series at the moment it was published
///
/// Cloning is cheap; readers keep working on their snapshot while writers
/// publish newer ones.
#[derive(Debug, Clone, Default)]
pub struct SeriesSnapshot {
    samples: Arc<Vec<Sample>>,
}

impl SeriesSnapshot {
    /// Wrap samples that are already sorted and unique
    #[must_use]
    pub fn from_sorted(samples: Vec<Sample>) -> Self {
        Self {
            samples: Arc::new(samples),
        }
    }

    /// All samples, oldest first
    #[must_use]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples held
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest sample
    #[must_use]
    pub fn first(&self) -> Option<Sample> {
        self.samples.first().copied()
    }

    /// Newest sample
    #[must_use]
    pub fn last(&self) -> Option<Sample> {
        self.samples.last().copied()
    }

    /// Samples in the inclusive window `[from, to]`
    #[must_use]
    pub fn range(&self, from: i64, to: i64) -> &[Sample] {
        range(&self.samples, from, to)
    }
}
