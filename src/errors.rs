// ABOUTME: Error types re-exported from lifestyle-core
// ABOUTME: AppError, ErrorCode, and the JSON error envelope used by every layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `lifestyle-core` so the series engine can convert
//! into them; this module re-exports them for the server crate.

pub use lifestyle_core::errors::*;
