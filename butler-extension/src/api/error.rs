//! API Error Handling
//!
//! Call failures become JSON bodies of the form `{ "title", "detail" }`.
//! Failed builds are not errors here; they travel inside status responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use butler_core::ExecutionError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound { title: String, detail: String },
    BadRequest(String),
    BadGateway { title: String, detail: String },
    InternalError { title: String, detail: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title, detail) = match self {
            ApiError::NotFound { title, detail } => (StatusCode::NOT_FOUND, title, detail),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "Invalid request.".to_string(), detail)
            }
            ApiError::BadGateway { title, detail } => {
                tracing::warn!("Jenkins call failed: {} {}", title, detail);
                (StatusCode::BAD_GATEWAY, title, detail)
            }
            ApiError::InternalError { title, detail } => {
                tracing::error!("Internal error: {} {}", title, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, title, detail)
            }
        };

        (
            status,
            Json(serde_json::json!({ "title": title, "detail": detail })),
        )
            .into_response()
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        let title = err.title().to_string();
        let detail = err.server_error().to_string();
        match err {
            ExecutionError::NotFound { .. } => ApiError::NotFound { title, detail },
            ExecutionError::Transport { .. } => ApiError::BadGateway { title, detail },
            ExecutionError::Invocation { .. } => ApiError::InternalError { title, detail },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
