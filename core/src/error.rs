//! Error types for the Notion client.
//!
//! `NotFound` gets a dedicated variant so callers can tell a missing page
//! apart from a rejected request. Every other non-2xx response lands in
//! `HttpError`, decoded from Notion's error object when the body is one.

use serde::Deserialize;

/// Errors returned by `NotionClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Notion returned 404: the database or page does not exist or is not
    /// shared with the integration.
    #[error("resource not found")]
    NotFound,

    /// Notion returned a non-2xx status other than 404.
    #[error("HTTP {status} {code}: {message}")]
    HttpError {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Notion's error envelope: `{"object":"error","status":..,"code":..,"message":..}`.
#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl ApiError {
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        if status == 404 {
            return ApiError::NotFound;
        }
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => ApiError::HttpError {
                status,
                code: err.code,
                message: err.message,
            },
            Err(_) => ApiError::HttpError {
                status,
                code: String::new(),
                message: body.to_string(),
            },
        }
    }
}
