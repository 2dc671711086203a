use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sharelens_core::CoreError;
use tokio::task::JoinError;

/// API error response body.
///
/// Every error returned by the HTTP layer serialises as:
/// ```json
/// { "error": "<message>" }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_not_found() {
            return Self::new(StatusCode::NOT_FOUND, err.to_string());
        }
        match err {
            CoreError::NotAvi { .. } => Self::bad_request(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

/// A blocking task that panicked or was aborted.
impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::internal(format!("worker task failed: {}", err))
    }
}
