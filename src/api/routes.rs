//! API Routes
//!
//! HTTP endpoints for the admission webhook, health checks, and metrics.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::admission::pipeline::{review_admission_request, PipelineError};
use crate::admission::types::AdmissionReviewResponse;
use crate::api::Metrics;
use crate::reviewer::Reviewer;
use crate::types::AdmissionResponse;

/// Shared API state.
pub struct ApiState {
    pub reviewer: Arc<Reviewer>,
    pub metrics: Arc<Metrics>,
    pub request_timeout: Duration,
}

/// Run the HTTP server exposing the admission webhook and observability
/// endpoints.
pub async fn run_api_server(
    listen_port: u16,
    reviewer: Arc<Reviewer>,
    metrics: Arc<Metrics>,
    request_timeout_ms: u64,
) -> anyhow::Result<()> {
    let state = Arc::new(ApiState {
        reviewer,
        metrics,
        request_timeout: Duration::from_millis(request_timeout_ms),
    });

    let app = Router::new()
        .route("/validate", post(validate))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(get_metrics_prometheus))
        .route("/metrics/json", get(get_metrics_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], listen_port));
    info!("admission webhook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}

/// `GET /healthz` — liveness. Always `200` once the process is up.
async fn healthz() -> impl IntoResponse {
    "OK"
}

/// `GET /readyz` — readiness. Identical to liveness today; split out so a
/// future policy/metadata backend reachability check has a home.
async fn readyz() -> impl IntoResponse {
    "OK"
}

/// `POST /validate` — the admission webhook entry point.
///
/// Always returns `200` with an `AdmissionReview` response — including when
/// the reviewer itself fails or times out, both of which fail closed as
/// `allowed=false` — except for a malformed workload payload, a handler bug
/// rather than a policy outcome, which maps to `500`.
async fn validate(State(state): State<Arc<ApiState>>, body: Bytes) -> impl IntoResponse {
    state.metrics.inc_requests();

    let outcome = tokio::time::timeout(
        state.request_timeout,
        review_admission_request(&body, &state.reviewer, &state.metrics),
    )
    .await;

    match outcome {
        Ok(Ok(review)) => {
            if review.response.allowed {
                state.metrics.inc_allowed();
            } else {
                state.metrics.inc_denied();
            }
            (StatusCode::OK, Json(review)).into_response()
        }
        Ok(Err(PipelineError::Decode(err))) => {
            error!(error = %err, "malformed workload payload");
            state.metrics.inc_errors();
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(_elapsed) => {
            warn!(timeout = ?state.request_timeout, "admission review timed out, denying (fail-closed)");
            state.metrics.inc_denied();
            let review = AdmissionReviewResponse::wrap(AdmissionResponse::deny(
                "",
                "admission review timed out",
            ));
            (StatusCode::OK, Json(review)).into_response()
        }
    }
}

/// `GET /metrics` — Prometheus text exposition format.
async fn get_metrics_prometheus(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
}

/// `GET /metrics/json` — JSON format metrics.
async fn get_metrics_json(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}
