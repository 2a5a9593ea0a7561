//! HTTP handlers for the executor API

use crate::ops::{Component, Dispatcher, ExecuteRequest, OpsError};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

fn status_for(error: &OpsError) -> StatusCode {
    match error {
        OpsError::UnknownComponent(_) => StatusCode::NOT_FOUND,
        OpsError::MissingOtm(_) | OpsError::InvalidOp { .. } | OpsError::Mapping(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        OpsError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler for component execution
pub async fn execute_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(id): Path<String>,
    Json(request): Json<ExecuteRequest>,
) -> impl IntoResponse {
    match dispatcher.execute(&id, &request) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            warn!("Component {} failed: {}", id, e);
            (status_for(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Handler for system status
pub async fn status_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "components": Component::ALL.iter().map(Component::as_str).collect::<Vec<_>>(),
        "rules": dispatcher.catalog().len(),
    }))
}
