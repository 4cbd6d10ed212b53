// ABOUTME: Shared benchmark utilities
// ABOUTME: Re-exports synthetic sensor series fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod fixtures;
