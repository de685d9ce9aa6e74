use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::descriptor::WorkloadDescriptor;
use super::service::{AdvisoryService, AdvisoryServiceError};

/// Router exposing rule listing, assessment, and report endpoints.
pub fn advisory_router(service: Arc<AdvisoryService>) -> Router {
    Router::new()
        .route("/rules", get(rules_handler))
        .route("/rules/reload", post(reload_handler))
        .route("/assess", post(assess_handler))
        .route("/report", post(report_handler))
        .with_state(service)
}

pub(crate) async fn rules_handler(State(service): State<Arc<AdvisoryService>>) -> Response {
    (StatusCode::OK, axum::Json(service.rules())).into_response()
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<AdvisoryService>>,
    axum::Json(descriptor): axum::Json<WorkloadDescriptor>,
) -> Response {
    match service.assess(descriptor) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler(
    State(service): State<Arc<AdvisoryService>>,
    axum::Json(descriptor): axum::Json<WorkloadDescriptor>,
) -> Response {
    match service.report(&descriptor) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reload_handler(State(service): State<Arc<AdvisoryService>>) -> Response {
    let outcome = tokio::task::spawn_blocking(move || service.reload()).await;
    match outcome {
        Ok(Ok(count)) => (StatusCode::OK, axum::Json(json!({ "count": count }))).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(join_error) => {
            error!(%join_error, "rule reload task failed");
            let payload = json!({ "error": "rule reload aborted" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(err: AdvisoryServiceError) -> Response {
    let status = match err {
        AdvisoryServiceError::ReloadUnavailable => StatusCode::CONFLICT,
        AdvisoryServiceError::Evaluation(_)
        | AdvisoryServiceError::RuleStore(_)
        | AdvisoryServiceError::Report(_) => {
            error!(error = %err, "advisory request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
