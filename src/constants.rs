// ABOUTME: Application constants re-exported from lifestyle-core
// ABOUTME: Routes, network defaults, telemetry limits, and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Constants are grouped into logical domains; see `lifestyle_core::constants`.

pub use lifestyle_core::constants::*;
