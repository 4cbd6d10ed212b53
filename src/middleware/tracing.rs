// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Generates or propagates x-request-id and creates spans for all HTTP requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::network::REQUEST_ID_HEADER;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;
use uuid::Uuid;

/// Request context that flows through the entire request lifecycle
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID echoed in `x-request-id`
    pub request_id: String,
    /// Authenticated caller, once known
    pub user_id: Option<Uuid>,
}

impl RequestContext {
    /// Create new request context with generated request ID
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(format!("req_{}", Uuid::new_v4().simple()))
    }

    /// Context carrying a request ID supplied by the client
    #[must_use]
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: None,
        }
    }

    /// Update context with the authenticated caller
    #[must_use]
    pub const fn with_auth(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Record context in current tracing span
    pub fn record_in_span(&self) {
        let span = Span::current();
        span.record("request_id", self.request_id.as_str());

        if let Some(user_id) = &self.user_id {
            span.record("user_id", user_id.to_string());
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a [`RequestContext`] to every request and echo its ID on the response
///
/// A client-supplied `x-request-id` is kept when it is valid header text;
/// otherwise a new one is generated.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let context = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(RequestContext::new, RequestContext::with_request_id);

    context.record_in_span();
    let header_value = HeaderValue::from_str(&context.request_id).ok();
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Create a tracing span for HTTP requests
#[must_use]
pub fn create_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
        user_id = tracing::field::Empty,
    )
}
