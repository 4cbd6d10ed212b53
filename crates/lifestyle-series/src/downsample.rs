// ABOUTME: Point-budget reduction of sorted sample windows
// ABOUTME: Largest-triangle-three-buckets by default, with mean and max bucket aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Downsampling
//!
//! Reduces a sorted window to at most `max_points` samples while keeping the
//! visual shape of the series:
//!
//! - The first and last samples of the window are always kept.
//! - Interior samples are split into `max_points - 2` contiguous buckets by
//!   index, so every bucket is non-empty once the window exceeds the budget
//!   and the output size is exactly `max_points`.
//! - `lttb` keeps one real sample per bucket, the one forming the largest
//!   triangle with the previously kept sample and the next bucket's centroid.
//!   Spikes survive because they dominate that area.
//! - `mean` emits the bucket's average timestamp and value.
//! - `max` keeps the bucket's highest-valued sample.
//!
//! The reduction is a pure function of its inputs.

use crate::error::SeriesError;
use crate::sample::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket reduction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMethod {
    /// Largest-triangle-three-buckets
    #[default]
    Lttb,
    /// Bucket average
    Mean,
    /// Bucket maximum
    Max,
}

impl DownsampleMethod {
    /// Name used in query strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lttb => "lttb",
            Self::Mean => "mean",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for DownsampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownsampleMethod {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lttb" => Ok(Self::Lttb),
            "mean" | "avg" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            other => Err(SeriesError::UnknownMethod(other.to_owned())),
        }
    }
}

/// Reduce a sorted window to at most `max_points` samples
///
/// Windows already within budget are returned unchanged. A budget of one
/// returns the newest sample; a budget of two returns the endpoints.
///
/// # Errors
///
/// Returns [`SeriesError::InvalidPointBudget`] when `max_points` is zero.
pub fn reduce(
    samples: &[Sample],
    max_points: usize,
    method: DownsampleMethod,
) -> Result<Vec<Sample>, SeriesError> {
    if max_points == 0 {
        return Err(SeriesError::InvalidPointBudget);
    }
    if samples.len() <= max_points {
        return Ok(samples.to_vec());
    }

    let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
        return Ok(Vec::new());
    };
    match max_points {
        1 => return Ok(vec![last]),
        2 => return Ok(vec![first, last]),
        _ => {}
    }

    let buckets = Buckets::new(samples, max_points - 2);
    let mut reduced = Vec::with_capacity(max_points);
    reduced.push(first);
    match method {
        DownsampleMethod::Lttb => largest_triangle(&buckets, first, last, &mut reduced),
        DownsampleMethod::Mean => reduced.extend(buckets.iter().map(bucket_mean)),
        DownsampleMethod::Max => reduced.extend(buckets.iter().map(bucket_max)),
    }
    reduced.push(last);
    Ok(reduced)
}

/// Interior of a window split into `count` index-contiguous buckets
struct Buckets<'a> {
    interior: &'a [Sample],
    count: usize,
}

impl<'a> Buckets<'a> {
    fn new(samples: &'a [Sample], count: usize) -> Self {
        Self {
            interior: &samples[1..samples.len() - 1],
            count,
        }
    }

    fn get(&self, index: usize) -> &'a [Sample] {
        let len = self.interior.len();
        let start = index * len / self.count;
        let end = (index + 1) * len / self.count;
        &self.interior[start..end]
    }

    fn iter(&self) -> impl Iterator<Item = &'a [Sample]> + '_ {
        (0..self.count).map(|index| self.get(index))
    }
}

fn largest_triangle(buckets: &Buckets<'_>, first: Sample, last: Sample, out: &mut Vec<Sample>) {
    // Both axes are normalised to the window so area products stay finite
    // even for values near f64::MAX
    let origin = first.timestamp;
    let span = (last.timestamp - origin).max(1) as f64;
    let magnitude = buckets
        .interior
        .iter()
        .chain([&first, &last])
        .map(|sample| sample.value.abs())
        .fold(0.0_f64, f64::max);
    let scale = if magnitude > 0.0 { magnitude } else { 1.0 };
    let x = |sample: &Sample| (sample.timestamp - origin) as f64 / span;
    let y = |sample: &Sample| sample.value / scale;

    let mut anchor = first;
    for index in 0..buckets.count {
        let (next_x, next_y) = if index + 1 < buckets.count {
            centroid(buckets.get(index + 1), &x, &y)
        } else {
            (x(&last), y(&last))
        };
        let (anchor_x, anchor_y) = (x(&anchor), y(&anchor));

        let bucket = buckets.get(index);
        let mut chosen = bucket[0];
        let mut largest = f64::NEG_INFINITY;
        for candidate in bucket {
            let area = ((anchor_x - next_x) * (y(candidate) - anchor_y)
                - (anchor_x - x(candidate)) * (next_y - anchor_y))
                .abs();
            if area > largest {
                largest = area;
                chosen = *candidate;
            }
        }
        out.push(chosen);
        anchor = chosen;
    }
}

fn centroid(
    bucket: &[Sample],
    x: impl Fn(&Sample) -> f64,
    y: impl Fn(&Sample) -> f64,
) -> (f64, f64) {
    (mean_of(bucket, x), mean_of(bucket, y))
}

/// Mean that stays finite for finite inputs of any magnitude
fn mean_of(bucket: &[Sample], field: impl Fn(&Sample) -> f64) -> f64 {
    let n = bucket.len() as f64;
    bucket.iter().map(|sample| field(sample) / n).sum()
}

fn bucket_mean(bucket: &[Sample]) -> Sample {
    let n = bucket.len();
    let timestamp_sum: i128 = bucket.iter().map(|sample| i128::from(sample.timestamp)).sum();
    Sample::new(
        (timestamp_sum / n as i128) as i64,
        mean_of(bucket, |sample| sample.value),
    )
}

fn bucket_max(bucket: &[Sample]) -> Sample {
    bucket
        .iter()
        .copied()
        .reduce(|best, sample| if sample.value > best.value { sample } else { best })
        .unwrap_or(Sample::new(0, 0.0))
}
