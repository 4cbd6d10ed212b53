// ABOUTME: Centralized resource container shared by every route handler
// ABOUTME: Holds configuration, bearer authentication, revocations, access policy and the telemetry service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at start-up and shared behind an `Arc`. Tests assemble their
//! own through [`ServerResourcesBuilder`] to inject a roster, a store or a
//! fixed signing secret.

use crate::auth::{AuthManager, InMemoryRevocationList};
use crate::config::ServerConfig;
use crate::permissions::{AccessPolicy, CoachRoster};
use crate::telemetry::TelemetryService;
use std::sync::Arc;
use tracing::warn;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Validated server configuration
    pub config: Arc<ServerConfig>,
    /// Bearer token validation
    pub auth_manager: AuthManager,
    /// Revoked tokens, consulted by `auth_manager`
    pub revocations: Arc<InMemoryRevocationList>,
    /// Cross-user read policy
    pub access_policy: Arc<dyn AccessPolicy>,
    /// Telemetry facade
    pub telemetry: TelemetryService,
}

impl ServerResources {
    /// Resources for `config` with an empty coach roster
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        ServerResourcesBuilder::new(config).build()
    }
}

/// Builder for [`ServerResources`]
pub struct ServerResourcesBuilder {
    config: ServerConfig,
    access_policy: Option<Arc<dyn AccessPolicy>>,
    telemetry: Option<TelemetryService>,
    revocations: Option<Arc<InMemoryRevocationList>>,
}

impl ServerResourcesBuilder {
    /// Start from a configuration
    #[must_use]
    pub const fn new(config: ServerConfig) -> Self {
        Self {
            config,
            access_policy: None,
            telemetry: None,
            revocations: None,
        }
    }

    /// Use a specific access policy instead of an empty roster
    #[must_use]
    pub fn with_access_policy(mut self, access_policy: Arc<dyn AccessPolicy>) -> Self {
        self.access_policy = Some(access_policy);
        self
    }

    /// Use an existing telemetry service instead of a fresh store
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: TelemetryService) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Share a revocation list with the caller
    #[must_use]
    pub fn with_revocations(mut self, revocations: Arc<InMemoryRevocationList>) -> Self {
        self.revocations = Some(revocations);
        self
    }

    /// Assemble the resources
    #[must_use]
    pub fn build(self) -> ServerResources {
        let secret = self.config.auth.jwt_secret.clone().unwrap_or_else(|| {
            warn!("JWT_SECRET is not set; using a random secret for this process only");
            AuthManager::generate_secret()
        });

        let revocations = self
            .revocations
            .unwrap_or_else(|| Arc::new(InMemoryRevocationList::new()));
        let auth_manager = AuthManager::new(
            secret.as_bytes(),
            self.config.auth.session_ttl_hours,
            revocations.clone(),
        );
        let telemetry = self
            .telemetry
            .unwrap_or_else(|| TelemetryService::from_config(&self.config.telemetry));
        let access_policy = self
            .access_policy
            .unwrap_or_else(|| Arc::new(CoachRoster::new()));

        ServerResources {
            config: Arc::new(self.config),
            auth_manager,
            revocations,
            access_policy,
            telemetry,
        }
    }
}
