// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Defaults, limits, and environment variable names for the streams service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single flat list.

/// Service identification used in logs and token audiences
pub mod service_names {
    /// Name of the HTTP service
    pub const LIFESTYLE_STREAMS: &str = "lifestyle-streams";
    /// Audience claim expected on bearer tokens
    pub const TOKEN_AUDIENCE: &str = "lifestyle-api";
}

/// API routes
pub mod routes {
    /// Sample ingestion and range query endpoint
    pub const STREAMS: &str = "/api/streams";
    /// Per-owner series listing
    pub const STREAM_METRICS: &str = "/api/streams/metrics";
    /// Liveness probe
    pub const HEALTH: &str = "/api/health";
    /// Readiness probe
    pub const READY: &str = "/api/ready";
}

/// Network defaults
pub mod network {
    /// Default bind host
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 4000;
    /// Default request body limit (6 MiB)
    pub const DEFAULT_BODY_LIMIT_BYTES: usize = 6 * 1024 * 1024;
    /// Request correlation header
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}

/// Telemetry engine limits and defaults
pub mod telemetry {
    /// Samples retained per series before the oldest are evicted
    pub const DEFAULT_RETENTION_CAPACITY: usize = 100_000;
    /// Point budget when a query does not specify `maxPoints`
    pub const DEFAULT_MAX_POINTS: usize = 500;
    /// Largest point budget a single query may request
    pub const DEFAULT_MAX_POINTS_LIMIT: usize = 10_000;
    /// Deadline applied to ingest and query calls
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
    /// Interval between background snapshots
    pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 300;
    /// Longest accepted metric name, in characters
    pub const MAX_METRIC_NAME_LENGTH: usize = 128;
    /// Snapshot file format version
    pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
}

/// Authentication defaults
pub mod auth {
    /// Bearer token lifetime
    pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
    /// Interval between purges of expired revocation entries (15 minutes)
    pub const DEFAULT_REVOCATION_PURGE_INTERVAL_SECS: u64 = 900;
    /// Length of a generated signing secret
    pub const GENERATED_SECRET_BYTES: usize = 64;
}

/// Environment variable names
pub mod env_config {
    /// Bind host
    pub const HOST: &str = "HOST";
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HS256 signing secret for bearer tokens
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Bearer token lifetime in hours
    pub const SESSION_TTL_HOURS: &str = "SESSION_TTL_HOURS";
    /// Request body limit in bytes
    pub const API_BODY_LIMIT_BYTES: &str = "API_BODY_LIMIT_BYTES";
    /// Comma-separated list of allowed CORS origins, or `*`
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Per-series retention capacity
    pub const STREAM_RETENTION_CAPACITY: &str = "STREAM_RETENTION_CAPACITY";
    /// Default query point budget
    pub const STREAM_DEFAULT_MAX_POINTS: &str = "STREAM_DEFAULT_MAX_POINTS";
    /// Maximum query point budget
    pub const STREAM_MAX_POINTS_LIMIT: &str = "STREAM_MAX_POINTS_LIMIT";
    /// Ingest/query deadline in milliseconds
    pub const STREAM_REQUEST_TIMEOUT_MS: &str = "STREAM_REQUEST_TIMEOUT_MS";
    /// Snapshot file path
    pub const STREAM_SNAPSHOT_PATH: &str = "STREAM_SNAPSHOT_PATH";
    /// Snapshot interval in seconds
    pub const STREAM_SNAPSHOT_INTERVAL_SECS: &str = "STREAM_SNAPSHOT_INTERVAL_SECS";
    /// Revocation purge interval in seconds
    pub const REVOCATION_PURGE_INTERVAL_SECS: &str = "REVOCATION_PURGE_INTERVAL_SECS";
}
