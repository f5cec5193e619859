//! Manual-trigger HTTP endpoint.
//!
//! - `GET /health` reports liveness.
//! - `POST /run` performs one full run and returns its [`RunReport`].
//!
//! The run is spawned as its own task, so a client that disconnects
//! mid-request does not cut the run short.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use sitecron_core::ConfigError;

use crate::orchestrator::{Orchestrator, RunReport};

/// Error type for the manual-trigger handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The run was aborted by a configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run task itself failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            ApiError::Config(e) => (e.code(), e.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Manual run failed");
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn trigger_run(
    State(orchestrator): State<Arc<Orchestrator>>,
) -> Result<Json<RunReport>, ApiError> {
    tracing::info!("Manual run requested");
    let report = orchestrator
        .spawn_run()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(report))
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/run", post(trigger_run))
        .with_state(orchestrator)
}
