// ABOUTME: Bearer token authentication for HTTP requests
// ABOUTME: Extracts the Authorization header and resolves it into an authenticated caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{AuthManager, AuthenticatedUser};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use axum::http::{header, HeaderMap};

const BEARER_PREFIX: &str = "Bearer ";

/// Token carried by an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// Returns `AuthRequired` when the header is missing and `AuthInvalid` when
/// it is not a non-empty bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(AppError::auth_required());
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

    match value.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::auth_invalid(
            "Invalid authorization header format - must be 'Bearer <token>'",
        )),
    }
}

/// Authenticate the request's bearer token
///
/// # Errors
///
/// Returns a 401-class error when the token is missing, malformed, invalid,
/// expired or revoked.
#[tracing::instrument(
    skip(auth_manager, headers),
    fields(user_id = tracing::field::Empty, success = tracing::field::Empty)
)]
pub fn authenticate_request(
    auth_manager: &AuthManager,
    headers: &HeaderMap,
) -> AppResult<AuthenticatedUser> {
    // Security: never log the header content
    let token = bearer_token(headers).inspect_err(|e| {
        tracing::Span::current().record("success", false);
        AppLogger::log_auth_event(None, "bearer", false, &e.message);
    })?;

    match auth_manager.authenticate(token) {
        Ok(user) => {
            tracing::Span::current()
                .record("user_id", user.user_id.to_string())
                .record("success", true);
            AppLogger::log_auth_event(Some(user.user_id), "bearer", true, "");
            Ok(user)
        }
        Err(e) => {
            tracing::Span::current().record("success", false);
            AppLogger::log_auth_event(None, "bearer", false, &e.to_string());
            Err(e.into())
        }
    }
}
