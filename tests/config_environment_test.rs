// ABOUTME: Unit tests for config environment functionality
// ABOUTME: Validates environment variable parsing, defaults and logging configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use lifestyle_streams::config::{Environment, ServerConfig};
use lifestyle_streams::errors::ErrorCode;
use lifestyle_streams::logging::{LogFormat, LoggingConfig};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const STREAM_VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "JWT_SECRET",
    "ENVIRONMENT",
    "STREAM_RETENTION_CAPACITY",
    "STREAM_DEFAULT_MAX_POINTS",
    "STREAM_MAX_POINTS_LIMIT",
    "STREAM_REQUEST_TIMEOUT_MS",
    "STREAM_SNAPSHOT_PATH",
    "LOG_FORMAT",
];

fn clear_env() {
    for key in STREAM_VARS {
        env::remove_var(key);
    }
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("production"),
        Environment::Production
    );
    assert_eq!(
        Environment::from_str_or_default("testing"),
        Environment::Testing
    );
    assert_eq!(
        Environment::from_str_or_default("invalid"),
        Environment::Development
    ); // Default fallback
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 4000);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.telemetry.retention_capacity, 100_000);
    assert!(config.telemetry.snapshot_path.is_none());
    assert!(config.auth.jwt_secret.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("JWT_SECRET", "from-the-environment");
    env::set_var("STREAM_MAX_POINTS_LIMIT", "2000");
    env::set_var("STREAM_DEFAULT_MAX_POINTS", "250");
    env::set_var("STREAM_REQUEST_TIMEOUT_MS", "750");
    env::set_var("STREAM_SNAPSHOT_PATH", "/tmp/lifestyle/streams.json");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.auth.jwt_secret.as_deref(), Some("from-the-environment"));
    assert_eq!(config.telemetry.max_points_limit, 2_000);
    assert_eq!(config.telemetry.default_max_points, 250);
    assert_eq!(config.telemetry.request_timeout, Duration::from_millis(750));
    assert_eq!(
        config.telemetry.snapshot_path,
        Some(PathBuf::from("/tmp/lifestyle/streams.json"))
    );
    assert!(!config.summary().contains("from-the-environment"));
}

#[test]
#[serial]
fn test_from_env_rejects_bad_values() {
    clear_env();
    env::set_var("STREAM_RETENTION_CAPACITY", "lots");
    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_env();
    env::set_var("STREAM_REQUEST_TIMEOUT_MS", "0");
    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    clear_env();
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    clear_env();
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ENVIRONMENT", "production");

    let config = LoggingConfig::from_env();
    clear_env();

    assert_eq!(config.format, LogFormat::Json);
    assert!(config.include_location);
    assert_eq!(config.environment, "production");
}
