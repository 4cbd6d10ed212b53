// ABOUTME: Synthetic sensor series for benchmarks
// ABOUTME: Generates heart-rate-like signals at realistic sampling rates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code, clippy::cast_precision_loss)]

use lifestyle_series::Sample;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Series sizes exercised by the benches
#[derive(Debug, Clone, Copy)]
pub enum SeriesSize {
    /// A short interval session
    Session,
    /// A long ride at 1 Hz
    Ride,
    /// A day of 1 Hz samples
    Day,
}

impl SeriesSize {
    pub const fn samples(self) -> usize {
        match self {
            Self::Session => 1_000,
            Self::Ride => 20_000,
            Self::Day => 86_400,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Session => "1k",
            Self::Ride => "20k",
            Self::Day => "86k",
        }
    }
}

/// Sorted heart-rate-like series sampled once per second
pub fn heart_rate_series(len: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(42);
    let start = 1_700_000_000_000_i64;
    (0..len)
        .map(|i| {
            let t = i as f64;
            let effort = 130.0 + 25.0 * (t / 600.0).sin();
            let timestamp = start + i64::try_from(i).unwrap_or(i64::MAX) * 1_000;
            Sample::new(timestamp, effort + rng.gen_range(-4.0..4.0))
        })
        .collect()
}

/// The same series in random order, as a phone flushing a buffer might send it
pub fn shuffled_series(len: usize) -> Vec<Sample> {
    let mut samples = heart_rate_series(len);
    samples.shuffle(&mut StdRng::seed_from_u64(7));
    samples
}
