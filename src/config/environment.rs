// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a validated ServerConfig with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::constants::{auth, env_config, network, telemetry};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Bearer token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret; a random one is generated when absent
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours
    pub session_ttl_hours: i64,
    /// Interval between purges of expired revocation entries
    pub revocation_purge_interval: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("revocation_purge_interval", &self.revocation_purge_interval)
            .finish()
    }
}

/// HTTP transport settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,
}

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated origin list, or `*`
    pub allowed_origins: String,
}

/// Telemetry engine settings
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Samples retained per series
    pub retention_capacity: usize,
    /// Point budget when a query omits `maxPoints`
    pub default_max_points: usize,
    /// Largest accepted `maxPoints`
    pub max_points_limit: usize,
    /// Deadline for ingest and query calls
    pub request_timeout: Duration,
    /// Snapshot file; memory only when `None`
    pub snapshot_path: Option<PathBuf>,
    /// Interval between background snapshots
    pub snapshot_interval: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            retention_capacity: telemetry::DEFAULT_RETENTION_CAPACITY,
            default_max_points: telemetry::DEFAULT_MAX_POINTS,
            max_points_limit: telemetry::DEFAULT_MAX_POINTS_LIMIT,
            request_timeout: Duration::from_millis(telemetry::DEFAULT_REQUEST_TIMEOUT_MS),
            snapshot_path: None,
            snapshot_interval: Duration::from_secs(telemetry::DEFAULT_SNAPSHOT_INTERVAL_SECS),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Bearer token settings
    pub auth: AuthConfig,
    /// HTTP transport settings
    pub http: HttpConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Telemetry engine settings
    pub telemetry: TelemetryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: network::DEFAULT_HOST.to_owned(),
            http_port: network::DEFAULT_HTTP_PORT,
            environment: Environment::Development,
            auth: AuthConfig {
                jwt_secret: None,
                session_ttl_hours: auth::DEFAULT_SESSION_TTL_HOURS,
                revocation_purge_interval: Duration::from_secs(
                    auth::DEFAULT_REVOCATION_PURGE_INTERVAL_SECS,
                ),
            },
            http: HttpConfig {
                body_limit_bytes: network::DEFAULT_BODY_LIMIT_BYTES,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_INVALID` error when a variable cannot be parsed or is
    /// outside its accepted range.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_INVALID` error when a value cannot be parsed or is
    /// outside its accepted range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let config = Self {
            host: value(env_config::HOST).unwrap_or(defaults.host),
            http_port: parse_or(&value, env_config::HTTP_PORT, defaults.http_port)?,
            environment: value(env_config::ENVIRONMENT)
                .map_or(defaults.environment, |v| Environment::from_str_or_default(&v)),
            auth: AuthConfig {
                jwt_secret: value(env_config::JWT_SECRET),
                session_ttl_hours: parse_or(
                    &value,
                    env_config::SESSION_TTL_HOURS,
                    defaults.auth.session_ttl_hours,
                )?,
                revocation_purge_interval: Duration::from_secs(parse_or(
                    &value,
                    env_config::REVOCATION_PURGE_INTERVAL_SECS,
                    auth::DEFAULT_REVOCATION_PURGE_INTERVAL_SECS,
                )?),
            },
            http: HttpConfig {
                body_limit_bytes: parse_or(
                    &value,
                    env_config::API_BODY_LIMIT_BYTES,
                    defaults.http.body_limit_bytes,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: value(env_config::CORS_ALLOWED_ORIGINS)
                    .unwrap_or(defaults.cors.allowed_origins),
            },
            telemetry: TelemetryConfig {
                retention_capacity: parse_or(
                    &value,
                    env_config::STREAM_RETENTION_CAPACITY,
                    defaults.telemetry.retention_capacity,
                )?,
                default_max_points: parse_or(
                    &value,
                    env_config::STREAM_DEFAULT_MAX_POINTS,
                    defaults.telemetry.default_max_points,
                )?,
                max_points_limit: parse_or(
                    &value,
                    env_config::STREAM_MAX_POINTS_LIMIT,
                    defaults.telemetry.max_points_limit,
                )?,
                request_timeout: Duration::from_millis(parse_or(
                    &value,
                    env_config::STREAM_REQUEST_TIMEOUT_MS,
                    telemetry::DEFAULT_REQUEST_TIMEOUT_MS,
                )?),
                snapshot_path: value(env_config::STREAM_SNAPSHOT_PATH).map(PathBuf::from),
                snapshot_interval: Duration::from_secs(parse_or(
                    &value,
                    env_config::STREAM_SNAPSHOT_INTERVAL_SECS,
                    telemetry::DEFAULT_SNAPSHOT_INTERVAL_SECS,
                )?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_INVALID` error describing the first violated constraint.
    pub fn validate(&self) -> AppResult<()> {
        let telemetry = &self.telemetry;
        if self.auth.session_ttl_hours <= 0 {
            return Err(AppError::config(format!(
                "{} must be positive",
                env_config::SESSION_TTL_HOURS
            )));
        }
        if telemetry.retention_capacity == 0 {
            return Err(AppError::config(format!(
                "{} must be at least 1",
                env_config::STREAM_RETENTION_CAPACITY
            )));
        }
        if telemetry.max_points_limit == 0 {
            return Err(AppError::config(format!(
                "{} must be at least 1",
                env_config::STREAM_MAX_POINTS_LIMIT
            )));
        }
        if telemetry.default_max_points == 0
            || telemetry.default_max_points > telemetry.max_points_limit
        {
            return Err(AppError::config(format!(
                "{} must be between 1 and {} ({})",
                env_config::STREAM_DEFAULT_MAX_POINTS,
                env_config::STREAM_MAX_POINTS_LIMIT,
                telemetry.max_points_limit
            )));
        }
        if telemetry.request_timeout.is_zero() {
            return Err(AppError::config(format!(
                "{} must be positive",
                env_config::STREAM_REQUEST_TIMEOUT_MS
            )));
        }
        if telemetry.snapshot_interval.is_zero() || self.auth.revocation_purge_interval.is_zero() {
            return Err(AppError::config("background task intervals must be positive"));
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let snapshot = self
            .telemetry
            .snapshot_path
            .as_ref()
            .map_or_else(|| "disabled (memory only)".to_owned(), |p| p.display().to_string());
        format!(
            "Lifestyle Streams Configuration:\n\
             - Environment: {}\n\
             - Bind: {}:{}\n\
             - JWT Secret: {}\n\
             - Session TTL: {}h\n\
             - Body Limit: {} bytes\n\
             - CORS Origins: {}\n\
             - Retention Capacity: {} samples/series\n\
             - Max Points: default {}, limit {}\n\
             - Request Timeout: {}ms\n\
             - Snapshots: {} (every {}s)",
            self.environment,
            self.host,
            self.http_port,
            if self.auth.jwt_secret.is_some() { "configured" } else { "generated" },
            self.auth.session_ttl_hours,
            self.http.body_limit_bytes,
            self.cors.allowed_origins,
            self.telemetry.retention_capacity,
            self.telemetry.default_max_points,
            self.telemetry.max_points_limit,
            self.telemetry.request_timeout.as_millis(),
            snapshot,
            self.telemetry.snapshot_interval.as_secs(),
        )
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T>(value: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifestyle_core::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.http_port, 4000);
        assert_eq!(config.auth.session_ttl_hours, 12);
        assert_eq!(config.http.body_limit_bytes, 6 * 1024 * 1024);
        assert_eq!(config.telemetry.retention_capacity, 100_000);
        assert_eq!(config.telemetry.default_max_points, 500);
        assert_eq!(config.telemetry.max_points_limit, 10_000);
        assert!(config.telemetry.snapshot_path.is_none());
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_PORT", "8081"),
            ("STREAM_RETENTION_CAPACITY", "50"),
            ("STREAM_SNAPSHOT_PATH", "/var/lib/lifestyle/streams.json"),
            ("STREAM_REQUEST_TIMEOUT_MS", "250"),
            ("ENVIRONMENT", "prod"),
            ("JWT_SECRET", "  "),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.telemetry.retention_capacity, 50);
        assert_eq!(config.telemetry.request_timeout, Duration::from_millis(250));
        assert!(config.environment.is_production());
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(
            config.telemetry.snapshot_path,
            Some(PathBuf::from("/var/lib/lifestyle/streams.json"))
        );
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = ServerConfig::from_lookup(lookup(&[("HTTP_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid);

        let err = ServerConfig::from_lookup(lookup(&[("STREAM_DEFAULT_MAX_POINTS", "20000")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid);

        let err = ServerConfig::from_lookup(lookup(&[("STREAM_RETENTION_CAPACITY", "0")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_summary_hides_secret() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "hunter2")])).unwrap();
        let summary = config.summary();
        assert!(summary.contains("configured"));
        assert!(!summary.contains("hunter2"));
        assert!(!format!("{:?}", config.auth).contains("hunter2"));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("other"), Environment::Development);
    }
}
