// ABOUTME: Cross-user access policy for telemetry reads
// ABOUTME: Resolves which owner's series a caller may read through an injectable AccessPolicy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Access policy
//!
//! Reading your own series never consults the policy. Reading another
//! user's series (a coach looking at an athlete) is allowed only when the
//! injected [`AccessPolicy`] says so. The telemetry service itself never
//! checks access; routes resolve the owner here first.

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use dashmap::DashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Decides whether one user may read another user's telemetry
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Whether `principal` may read series owned by `owner`
    ///
    /// # Errors
    ///
    /// Returns an error if the policy's backing data cannot be consulted
    async fn can_access(&self, principal: Uuid, owner: Uuid) -> AppResult<bool>;
}

/// In-memory coach/athlete roster
///
/// A coach sees the athletes linked to them. Head coaches see everyone.
#[derive(Debug, Default)]
pub struct CoachRoster {
    links: DashSet<(Uuid, Uuid)>,
    head_coaches: DashSet<Uuid>,
}

impl CoachRoster {
    /// Empty roster
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link an athlete to a coach. Returns false if the link already existed.
    pub fn link(&self, coach: Uuid, athlete: Uuid) -> bool {
        self.links.insert((coach, athlete))
    }

    /// Remove a coach/athlete link. Returns false if there was none.
    pub fn unlink(&self, coach: Uuid, athlete: Uuid) -> bool {
        self.links.remove(&(coach, athlete)).is_some()
    }

    /// Grant the head coach role
    pub fn promote(&self, coach: Uuid) {
        self.head_coaches.insert(coach);
    }

    /// Forget a user entirely, as either coach or athlete
    pub fn remove_user(&self, user: Uuid) {
        self.links
            .retain(|(coach, athlete)| *coach != user && *athlete != user);
        self.head_coaches.remove(&user);
    }

    /// Whether `coach` is linked to `athlete`
    #[must_use]
    pub fn is_linked(&self, coach: Uuid, athlete: Uuid) -> bool {
        self.links.contains(&(coach, athlete))
    }

    /// Whether `user` holds the head coach role
    #[must_use]
    pub fn is_head_coach(&self, user: Uuid) -> bool {
        self.head_coaches.contains(&user)
    }
}

#[async_trait]
impl AccessPolicy for CoachRoster {
    async fn can_access(&self, principal: Uuid, owner: Uuid) -> AppResult<bool> {
        Ok(self.is_head_coach(principal) || self.is_linked(principal, owner))
    }
}

/// Owner whose series the caller will read
///
/// `requested` is the optional `athleteId` parameter. Absent, or equal to
/// the caller, it resolves to the caller without asking the policy.
///
/// # Errors
///
/// Returns [`AppError::forbidden`] when the policy denies access, or the
/// policy's own error when it cannot decide.
pub async fn resolve_owner(
    policy: &dyn AccessPolicy,
    principal: Uuid,
    requested: Option<Uuid>,
) -> AppResult<Uuid> {
    let owner = match requested {
        None => return Ok(principal),
        Some(owner) if owner == principal => return Ok(principal),
        Some(owner) => owner,
    };

    if policy.can_access(principal, owner).await? {
        debug!(user.id = %principal, owner.id = %owner, "Cross-user telemetry access granted");
        Ok(owner)
    } else {
        warn!(user.id = %principal, owner.id = %owner, "Cross-user telemetry access denied");
        Err(AppError::forbidden(
            "Not permitted to read this athlete's telemetry",
        )
        .with_user_id(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    struct FailingPolicy;

    #[async_trait]
    impl AccessPolicy for FailingPolicy {
        async fn can_access(&self, _principal: Uuid, _owner: Uuid) -> AppResult<bool> {
            Err(AppError::store_unavailable("roster offline"))
        }
    }

    #[tokio::test]
    async fn test_self_access_skips_policy() {
        let me = Uuid::new_v4();
        assert_eq!(resolve_owner(&FailingPolicy, me, None).await.unwrap(), me);
        assert_eq!(resolve_owner(&FailingPolicy, me, Some(me)).await.unwrap(), me);
    }

    #[tokio::test]
    async fn test_linked_coach_may_read_athlete() {
        let roster = CoachRoster::new();
        let coach = Uuid::new_v4();
        let athlete = Uuid::new_v4();
        assert!(roster.link(coach, athlete));
        assert!(!roster.link(coach, athlete));

        assert_eq!(
            resolve_owner(&roster, coach, Some(athlete)).await.unwrap(),
            athlete
        );

        // Links are directional
        let err = resolve_owner(&roster, athlete, Some(coach)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        assert!(roster.unlink(coach, athlete));
        assert!(!roster.unlink(coach, athlete));
        assert!(resolve_owner(&roster, coach, Some(athlete)).await.is_err());
    }

    #[tokio::test]
    async fn test_unlinked_user_is_denied() {
        let roster = CoachRoster::new();
        let err = resolve_owner(&roster, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_head_coach_sees_everyone() {
        let roster = CoachRoster::new();
        let head = Uuid::new_v4();
        roster.promote(head);
        let anyone = Uuid::new_v4();
        assert_eq!(resolve_owner(&roster, head, Some(anyone)).await.unwrap(), anyone);
    }

    #[tokio::test]
    async fn test_remove_user_drops_links_and_role() {
        let roster = CoachRoster::new();
        let coach = Uuid::new_v4();
        let athlete = Uuid::new_v4();
        roster.link(coach, athlete);
        roster.promote(coach);

        roster.remove_user(coach);
        assert!(!roster.is_linked(coach, athlete));
        assert!(!roster.is_head_coach(coach));
        assert!(!roster.can_access(coach, athlete).await.unwrap());
    }

    #[tokio::test]
    async fn test_policy_errors_propagate() {
        let err = resolve_owner(&FailingPolicy, Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }
}
