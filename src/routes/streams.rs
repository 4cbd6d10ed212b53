// ABOUTME: Route handlers for the sensor telemetry streams API
// ABOUTME: Batched sample ingestion, downsampled range queries and per-owner metric listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Streams routes
//!
//! Every endpoint requires a bearer token. Ingestion always writes to the
//! caller's own series; reads may target another user through `athleteId`
//! when the access policy allows it.

use crate::{
    constants::routes,
    errors::{AppError, AppResult},
    middleware::{authenticate_request, RequestContext},
    permissions::resolve_owner,
    resources::ServerResources,
    telemetry::{IngestBatch, RangeQuery},
};
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use lifestyle_series::{DownsampleMethod, Sample, SeriesSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Response for an accepted ingestion batch
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Metric the samples were written to
    pub metric: String,
    /// Samples written
    pub accepted: usize,
}

/// Query parameters for a range query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQueryParams {
    /// Metric name (required)
    pub metric: Option<String>,
    /// Inclusive lower bound in epoch millis (required)
    pub from: Option<i64>,
    /// Inclusive upper bound in epoch millis (required)
    pub to: Option<i64>,
    /// Point budget
    pub max_points: Option<i64>,
    /// Reduction method: lttb, mean or max
    pub method: Option<String>,
    /// Read another user's series
    pub athlete_id: Option<Uuid>,
}

/// Query parameters for the metric listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQueryParams {
    /// Read another user's series
    pub athlete_id: Option<Uuid>,
}

/// Response for the metric listing
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    /// One entry per series
    pub metrics: Vec<SeriesSummary>,
}

/// Decode an ingestion body, dropping sample entries that do not fit the
/// `{ timestamp: non-negative integer, value: finite number }` shape
///
/// # Errors
///
/// Returns an error when the body is not an object or lacks `metric` or `samples`
pub fn decode_ingest_body(body: &Value) -> AppResult<IngestBatch> {
    let object = body
        .as_object()
        .ok_or_else(|| AppError::invalid_input("Request body must be a JSON object"))?;

    let metric = match object.get("metric") {
        None | Some(Value::Null) => return Err(AppError::missing_field("metric")),
        Some(Value::String(metric)) => metric.clone(),
        Some(_) => return Err(AppError::invalid_input("metric must be a string")),
    };
    let entries = match object.get("samples") {
        None | Some(Value::Null) => return Err(AppError::missing_field("samples")),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(AppError::invalid_input("samples must be an array")),
    };

    let mut batch = IngestBatch::new(metric, Vec::with_capacity(entries.len()));
    for entry in entries {
        match decode_sample(entry) {
            Some(sample) => batch.samples.push(sample),
            None => batch.malformed += 1,
        }
    }
    Ok(batch)
}

fn decode_sample(entry: &Value) -> Option<Sample> {
    let timestamp = entry.get("timestamp")?.as_i64()?;
    let value = entry.get("value")?.as_f64()?;
    let sample = Sample::new(timestamp, value);
    sample.is_valid().then_some(sample)
}

/// Streams routes handler
pub struct StreamsRoutes;

impl StreamsRoutes {
    /// Create all streams routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::STREAMS,
                get(Self::handle_query).post(Self::handle_ingest),
            )
            .route(routes::STREAM_METRICS, get(Self::handle_list_metrics))
            .with_state(resources)
    }

    fn request_context(context: Option<Extension<RequestContext>>) -> RequestContext {
        context.map_or_else(RequestContext::new, |Extension(context)| context)
    }

    /// Handle POST /api/streams - ingest a batch into the caller's series
    async fn handle_ingest(
        State(resources): State<Arc<ServerResources>>,
        context: Option<Extension<RequestContext>>,
        headers: HeaderMap,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let context = Self::request_context(context);
        Self::ingest(&resources, &context, &headers, body)
            .await
            .map_err(|e| e.with_request_id(&context.request_id))
    }

    async fn ingest(
        resources: &ServerResources,
        context: &RequestContext,
        headers: &HeaderMap,
        body: Result<Json<Value>, JsonRejection>,
    ) -> AppResult<Response> {
        let user = authenticate_request(&resources.auth_manager, headers)?;
        context.clone().with_auth(user.user_id).record_in_span();

        let Json(body) =
            body.map_err(|e| AppError::invalid_input(format!("Invalid JSON body: {e}")))?;
        let batch = decode_ingest_body(&body)?;
        if batch.malformed > 0 {
            debug!(
                user.id = %user.user_id,
                malformed = batch.malformed,
                "Dropped undecodable sample entries"
            );
        }

        let metric = batch.metric.trim().to_owned();
        let report = resources.telemetry.ingest(user.user_id, batch).await?;

        let response = IngestResponse {
            metric,
            accepted: report.accepted,
        };
        Ok((StatusCode::ACCEPTED, Json(response)).into_response())
    }

    /// Handle GET /api/streams - downsampled range query
    async fn handle_query(
        State(resources): State<Arc<ServerResources>>,
        context: Option<Extension<RequestContext>>,
        headers: HeaderMap,
        params: Result<Query<StreamQueryParams>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let context = Self::request_context(context);
        Self::query(&resources, &context, &headers, params)
            .await
            .map_err(|e| e.with_request_id(&context.request_id))
    }

    async fn query(
        resources: &ServerResources,
        context: &RequestContext,
        headers: &HeaderMap,
        params: Result<Query<StreamQueryParams>, QueryRejection>,
    ) -> AppResult<Response> {
        let user = authenticate_request(&resources.auth_manager, headers)?;
        context.clone().with_auth(user.user_id).record_in_span();

        let Query(params) =
            params.map_err(|e| AppError::invalid_input(format!("Invalid query parameters: {e}")))?;
        let query = Self::range_query(params.metric, params.from, params.to)?;
        let query = match params.max_points {
            Some(max_points) if max_points <= 0 => {
                return Err(AppError::invalid_input("maxPoints must be at least 1"))
            }
            Some(max_points) => query.with_max_points(usize::try_from(max_points).map_err(
                |_| AppError::out_of_range("maxPoints is too large"),
            )?),
            None => query,
        };
        let query = match params.method.as_deref() {
            Some(method) => query.with_method(method.parse::<DownsampleMethod>()?),
            None => query,
        };

        let owner =
            resolve_owner(resources.access_policy.as_ref(), user.user_id, params.athlete_id)
                .await?;
        let result = resources.telemetry.query(owner, query).await?;

        Ok((StatusCode::OK, Json(result)).into_response())
    }

    fn range_query(metric: Option<String>, from: Option<i64>, to: Option<i64>) -> AppResult<RangeQuery> {
        let metric = metric.ok_or_else(|| AppError::missing_field("metric"))?;
        let from = from.ok_or_else(|| AppError::missing_field("from"))?;
        let to = to.ok_or_else(|| AppError::missing_field("to"))?;
        Ok(RangeQuery::new(metric, from, to))
    }

    /// Handle GET /api/streams/metrics - list the owner's series
    async fn handle_list_metrics(
        State(resources): State<Arc<ServerResources>>,
        context: Option<Extension<RequestContext>>,
        headers: HeaderMap,
        params: Result<Query<MetricsQueryParams>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let context = Self::request_context(context);
        Self::list_metrics(&resources, &context, &headers, params)
            .await
            .map_err(|e| e.with_request_id(&context.request_id))
    }

    async fn list_metrics(
        resources: &ServerResources,
        context: &RequestContext,
        headers: &HeaderMap,
        params: Result<Query<MetricsQueryParams>, QueryRejection>,
    ) -> AppResult<Response> {
        let user = authenticate_request(&resources.auth_manager, headers)?;
        context.clone().with_auth(user.user_id).record_in_span();

        let Query(params) =
            params.map_err(|e| AppError::invalid_input(format!("Invalid query parameters: {e}")))?;
        let owner =
            resolve_owner(resources.access_policy.as_ref(), user.user_id, params.athlete_id)
                .await?;
        let metrics = resources.telemetry.list_metrics(owner).await?;

        Ok((StatusCode::OK, Json(MetricsResponse { metrics })).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_decode_drops_malformed_entries() {
        let body = json!({
            "metric": "heart_rate",
            "samples": [
                { "timestamp": 1_000, "value": 61.5 },
                { "timestamp": -1, "value": 60 },
                { "timestamp": 1.5, "value": 60 },
                { "timestamp": 2_000, "value": "fast" },
                { "timestamp": 3_000 },
                "garbage",
                { "timestamp": 4_000, "value": 64 }
            ]
        });

        let batch = decode_ingest_body(&body).unwrap();
        assert_eq!(batch.metric, "heart_rate");
        assert_eq!(batch.samples, vec![Sample::new(1_000, 61.5), Sample::new(4_000, 64.0)]);
        assert_eq!(batch.malformed, 5);
    }

    #[test]
    fn test_decode_requires_metric_and_samples() {
        let err = decode_ingest_body(&json!({ "samples": [] })).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        let err = decode_ingest_body(&json!({ "metric": "hr" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        let err = decode_ingest_body(&json!({ "metric": "hr", "samples": 3 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = decode_ingest_body(&json!([1, 2])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
