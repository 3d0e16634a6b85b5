//! Application error type mapping to HTTP status codes and the error body format.
//!
//! Every failure is rendered as:
//! ```json
//! { "errors": [{ "code": "SESSION_NOT_FOUND", "message": "Session not found", "details": null }] }
//! ```

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session service errors.
    Chat(ChatError),
    /// Request body could not be read as the expected JSON.
    MalformedBody(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, serde_json::Value) {
        match self {
            AppError::Chat(ChatError::BadRequest(msg)) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                serde_json::Value::Null,
            ),
            AppError::Chat(ChatError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
                serde_json::Value::Null,
            ),
            AppError::Chat(ChatError::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid {field}: {message}"),
                json!({ field.as_str(): [message] }),
            ),
            AppError::Chat(e @ ChatError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
                serde_json::Value::Null,
            ),
            AppError::MalformedBody(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                serde_json::Value::Null,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, status = status.as_u16(), "Request rejected");
        }

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
                "details": details,
            }]
        });

        (status, Json(body)).into_response()
    }
}
