//! Handler errors and their HTTP rendering.
//!
//! Input problems become 400 with the message; anything from Notion or the
//! blocking pool becomes a 500 with a fixed body, and the detail goes to the
//! log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Errors a handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected before any remote call.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "remote store request failed" })),
                )
                    .into_response()
            }
        }
    }
}
