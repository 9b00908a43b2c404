//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;
use crate::locale::Locale;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub upstream: CheckResult,
    pub fallback: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn unavailable() -> Self {
        Self {
            status: "unavailable",
            message: Some("not configured".to_string()),
        }
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe
///
/// The canned fallback always answers, so a missing upstream only degrades
/// reply quality and never fails readiness.
async fn ready(State(state): State<Arc<ApiState>>) -> Json<ReadinessResponse> {
    let upstream = match state.responder.upstream_name() {
        Some(_) => CheckResult::ok(),
        None => CheckResult::unavailable(),
    };

    Json(ReadinessResponse {
        status: "ok",
        checks: ReadinessChecks {
            upstream,
            fallback: CheckResult::ok(),
        },
    })
}

/// Relay status
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<&'static str>,
    pub languages: Vec<Locale>,
    pub max_message_chars: usize,
}

async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.responder.upstream_name(),
        languages: Locale::ALL.to_vec(),
        max_message_chars: state.max_message_chars,
    })
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/api/status", get(status))
        .with_state(state)
}
