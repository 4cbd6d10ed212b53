// ABOUTME: Injectable token revocation capability
// ABOUTME: In-memory list of revoked token fingerprints with expiry-based purging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Answers whether a presented bearer token has been revoked
pub trait RevocationCheck: Send + Sync {
    /// Whether `token` was revoked and has not yet expired
    fn is_revoked(&self, token: &str) -> bool;
}

/// Revocation list keyed by SHA-256 fingerprints of the revoked tokens
///
/// Raw tokens are never stored. Each entry is kept until the token's own
/// expiry, after which the token is rejected on its expiry anyway and the entry
/// can be purged.
#[derive(Debug, Default)]
pub struct InMemoryRevocationList {
    revoked: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRevocationList {
    /// Create an empty revocation list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint stored in place of the raw token
    #[must_use]
    pub fn fingerprint(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Revoke `token` until `expires_at`
    pub fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        self.revoked.insert(Self::fingerprint(token), expires_at);
    }

    /// Drop entries whose token has expired. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        let removed = before.saturating_sub(self.revoked.len());
        if removed > 0 {
            debug!(removed, remaining = self.revoked.len(), "Purged expired revocations");
        }
        removed
    }

    /// Number of tracked revocations
    #[must_use]
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// Whether no revocations are tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

impl RevocationCheck for InMemoryRevocationList {
    fn is_revoked(&self, token: &str) -> bool {
        self.revoked
            .get(&Self::fingerprint(token))
            .is_some_and(|expires_at| *expires_at > Utc::now())
    }
}
