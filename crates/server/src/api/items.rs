//! Item API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use itemflow_core::{Item, ProcessError, ServiceError};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ItemErrorResponse {
    pub error: String,
}

type ItemError = (StatusCode, Json<ItemErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ItemError {
    (
        status,
        Json(ItemErrorResponse {
            error: error.into(),
        }),
    )
}

fn service_error_response(e: ServiceError) -> ItemError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Processing(ProcessError::ShutDown) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Store(_) | ServiceError::Processing(_) => {
            error!(error = %e, "Item request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, e.to_string())
}

fn body_rejection_response(rejection: JsonRejection) -> ItemError {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Validation failed: {}", rejection.body_text()),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// List all items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, impl IntoResponse> {
    state
        .service()
        .list_all()
        .await
        .map(Json)
        .map_err(service_error_response)
}

/// Create an item
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Item>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), impl IntoResponse> {
    let item = match body {
        Ok(Json(item)) => item,
        Err(rejection) => return Err(body_rejection_response(rejection)),
    };

    match state.service().create(item).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(saved))),
        Err(e) => Err(service_error_response(e)),
    }
}

/// Get an item by ID
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, impl IntoResponse> {
    match state.service().find_by_id(id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Item not found: {}", id),
        )),
        Err(e) => Err(service_error_response(e)),
    }
}

/// Replace an item
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Result<Json<Item>, JsonRejection>,
) -> Result<Json<Item>, impl IntoResponse> {
    let item = match body {
        Ok(Json(item)) => item,
        Err(rejection) => return Err(body_rejection_response(rejection)),
    };

    state
        .service()
        .update(id, item)
        .await
        .map(Json)
        .map_err(service_error_response)
}

/// Delete an item
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, impl IntoResponse> {
    state
        .service()
        .delete_by_id(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(service_error_response)
}

/// Mark every stored item as processed and return them.
///
/// Bounded by `processor.run_timeout_secs`. On timeout the caller gets a 504
/// while units already dispatched finish on their own.
pub async fn process_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, impl IntoResponse> {
    let timeout = state.config().processor.run_timeout();

    match tokio::time::timeout(timeout, state.service().process_all()).await {
        Ok(Ok(outcome)) => Ok(Json(outcome.items)),
        Ok(Err(e)) => Err(service_error_response(e)),
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Processing run timed out");
            Err(error_response(
                StatusCode::GATEWAY_TIMEOUT,
                format!("Processing run timed out after {}s", timeout.as_secs()),
            ))
        }
    }
}
