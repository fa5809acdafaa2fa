// SPDX-License-Identifier: Apache-2.0
//! Stateless request dispatch and the uniform CORS/JSON response envelope.
//!
//! `route` is a plain async fn over `(method, path, body)` so the whole HTTP
//! surface is exercisable in tests without a listener; the axum fallback
//! handler in `main` is a thin wrapper around it.

use crate::cache::{CacheKey, CacheStatus};
use crate::AppState;
use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use carbon_core::{calculate, sample_tips};
use serde::Deserialize;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error};

/// How many tips one `/api/tips` response carries.
const TIP_SAMPLE: usize = 3;

/// One response from the dispatch layer, before the envelope is applied.
pub(crate) struct ApiResponse {
    pub(crate) status: StatusCode,
    /// Serialized JSON body; empty only for the preflight short-circuit.
    pub(crate) body: String,
    /// Set on cacheable branches: `X-Cache` status and `max-age` seconds.
    pub(crate) cache: Option<(CacheStatus, u64)>,
}

impl ApiResponse {
    fn json(status: StatusCode, body: String) -> Self {
        Self {
            status,
            body,
            cache: None,
        }
    }

    fn cached(body: String, status: CacheStatus, max_age: u64) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            cache: Some((status, max_age)),
        }
    }

    /// Empty 200 for `OPTIONS *`; the envelope supplies the CORS headers.
    fn preflight() -> Self {
        Self::json(StatusCode::OK, String::new())
    }

    fn bad_request(message: &str) -> Self {
        Self::json(
            StatusCode::BAD_REQUEST,
            json!({ "error": message }).to_string(),
        )
    }

    fn not_found() -> Self {
        Self::json(
            StatusCode::NOT_FOUND,
            json!({ "error": "Not Found" }).to_string(),
        )
    }

    fn internal_error(err: &anyhow::Error) -> Self {
        Self::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Internal Error", "message": err.to_string() }).to_string(),
        )
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut builder = Response::builder()
            .status(self.status)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
            .header(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization",
            )
            .header(header::CONTENT_TYPE, "application/json");
        if let Some((status, max_age)) = self.cache {
            builder = builder
                .header("X-Cache", status.as_str())
                .header(header::CACHE_CONTROL, format!("max-age={max_age}"));
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

#[derive(Debug, Deserialize)]
struct CalculationRequest {
    category: String,
    #[serde(rename = "type")]
    activity: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct AdviceRequest {
    #[serde(rename = "weekCarbon")]
    week_carbon: f64,
    #[serde(rename = "topCategory")]
    top_category: String,
    #[serde(rename = "apiKey", default)]
    api_key: Option<String>,
}

/// Dispatch one request. Every branch, including faults, comes back as a
/// well-formed JSON envelope; nothing escapes as a raw error.
pub(crate) async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    body: &[u8],
) -> ApiResponse {
    if *method == Method::OPTIONS {
        return ApiResponse::preflight();
    }
    match dispatch(state, method, path, body).await {
        Ok(response) => response,
        Err(err) => {
            error!(?err, %path, "request handler fault");
            ApiResponse::internal_error(&err)
        }
    }
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Result<ApiResponse> {
    if *method == Method::GET && path == "/api/factors" {
        return factors(state);
    }
    if *method == Method::POST && path == "/api/calculate" {
        return calculate_request(state, body);
    }
    if *method == Method::GET && path == "/api/tips" {
        return tips(state);
    }
    if *method == Method::POST && path == "/api/ai-advice" {
        return ai_advice(state, body).await;
    }
    if *method == Method::GET && path == "/api/health" {
        return Ok(health());
    }
    Ok(ApiResponse::not_found())
}

/// Read-through: serve the stored body on HIT, otherwise compute and store.
/// No single-flight — a refresh race recomputes twice and the last writer wins.
fn read_through(
    state: &AppState,
    key: CacheKey,
    compute: impl FnOnce() -> Result<String>,
) -> Result<ApiResponse> {
    let max_age = state.cache.ttl(key).as_secs();
    if let Some(body) = state.cache.lookup(key) {
        debug!(?key, "edge cache hit");
        return Ok(ApiResponse::cached(body, CacheStatus::Hit, max_age));
    }
    let body = compute()?;
    state.cache.store(key, body.clone());
    debug!(?key, "edge cache miss; stored fresh body");
    Ok(ApiResponse::cached(body, CacheStatus::Miss, max_age))
}

fn factors(state: &AppState) -> Result<ApiResponse> {
    read_through(state, CacheKey::Factors, || {
        serde_json::to_string(&state.catalog).context("serialize factor catalog")
    })
}

fn tips(state: &AppState) -> Result<ApiResponse> {
    read_through(state, CacheKey::Tips, || {
        // Reshuffled only on MISS; every caller inside the freshness window
        // observes the identical sample.
        let tips = sample_tips(&mut rand::thread_rng(), TIP_SAMPLE);
        Ok(json!({ "tips": tips }).to_string())
    })
}

fn calculate_request(state: &AppState, body: &[u8]) -> Result<ApiResponse> {
    let request: CalculationRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            return Ok(ApiResponse::bad_request(&format!(
                "invalid request body: {err}"
            )))
        }
    };
    match calculate(
        &state.catalog,
        &request.category,
        &request.activity,
        request.amount,
    ) {
        Ok(calculation) => Ok(ApiResponse::json(
            StatusCode::OK,
            serde_json::to_string(&calculation).context("serialize calculation")?,
        )),
        Err(err) => Ok(ApiResponse::bad_request(&err.to_string())),
    }
}

async fn ai_advice(state: &AppState, body: &[u8]) -> Result<ApiResponse> {
    let request: AdviceRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            return Ok(ApiResponse::bad_request(&format!(
                "invalid request body: {err}"
            )))
        }
    };
    // The resolver cannot fail outward; this is always a 200.
    let advice = state
        .advice
        .resolve(
            request.week_carbon,
            &request.top_category,
            request.api_key.as_deref(),
        )
        .await;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_string(&advice).context("serialize advice")?,
    ))
}

fn health() -> ApiResponse {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);
    ApiResponse::json(
        StatusCode::OK,
        json!({
            "status": "ok",
            "service": "CarbonTrace",
            "timestamp": timestamp,
            "edge": true,
        })
        .to_string(),
    )
}
