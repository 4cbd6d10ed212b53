// ABOUTME: JWT-based bearer token authentication
// ABOUTME: Issues and validates HS256 session tokens and consults an injectable revocation check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Sessions are issued elsewhere in the product; this service only needs to
//! turn a bearer token into an [`AuthenticatedUser`]. Tokens are HS256 JWTs
//! signed with the shared `JWT_SECRET`. Revocation is consulted through the
//! [`RevocationCheck`] capability rather than any process-wide state.

/// Token revocation capability and its in-memory implementation
pub mod revocation;

pub use revocation::{InMemoryRevocationList, RevocationCheck};

use crate::constants::{auth::GENERATED_SECRET_BYTES, service_names};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token was revoked before its expiry
    TokenRevoked,
    /// Token signature or claims are invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired { expired_at } => write!(
                f,
                "JWT token expired at {}",
                expired_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::TokenRevoked => write!(f, "JWT token has been revoked"),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } | JwtValidationError::TokenRevoked => {
                Self::auth_expired(error.to_string())
            }
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims for a user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Unique token `ID`
    pub jti: String,
}

/// Caller identity established from a valid bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// When the presented token expires
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for HS256 bearer tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    revocations: Arc<dyn RevocationCheck>,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(
        secret: &[u8],
        token_expiry_hours: i64,
        revocations: Arc<dyn RevocationCheck>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            revocations,
        }
    }

    /// Generate a random hex-encoded signing secret
    #[must_use]
    pub fn generate_secret() -> String {
        let mut bytes = vec![0_u8; GENERATED_SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Session lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user_id: Uuid) -> AppResult<String> {
        self.generate_token_with_ttl(user_id, Duration::hours(self.token_expiry_hours))
    }

    /// Generate a token with an explicit lifetime (negative lifetimes produce expired tokens)
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token_with_ttl(&self, user_id: Uuid, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            aud: service_names::TOKEN_AUDIENCE.to_owned(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token's signature, audience and expiry
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_audience(&[service_names::TOKEN_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    let expired_at = self.token_expiry(token).unwrap_or_else(|_| Utc::now());
                    JwtValidationError::TokenExpired { expired_at }
                } else {
                    Self::convert_jwt_error(&e)
                }
            })
    }

    /// Authenticate a bearer token into a caller identity
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is invalid, expired or revoked
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, JwtValidationError> {
        let claims = self.validate_token(token)?;

        if self.revocations.is_revoked(token) {
            return Err(JwtValidationError::TokenRevoked);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|e| JwtValidationError::TokenInvalid {
            reason: format!("subject is not a user id: {e}"),
        })?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        Ok(AuthenticatedUser {
            user_id,
            expires_at,
        })
    }

    /// Expiry of a token whose signature is valid, ignoring whether it has expired
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is malformed or wrongly signed
    pub fn token_expiry(&self, token: &str) -> Result<DateTime<Utc>, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[service_names::TOKEN_AUDIENCE]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| Self::convert_jwt_error(&e))?
            .claims;
        Ok(DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now))
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &JwtError) -> JwtValidationError {
        tracing::debug!("JWT token validation failed: {e:?}");

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
                reason: "Token audience mismatch".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}
