use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::clients::ClientError;
use crate::store::StoreError;

/// HTTP-surface error. Every failure response carries a `success: false`
/// body with a human-readable `error` and a machine-readable `code`;
/// internal detail goes to the logs only.
#[derive(Debug)]
pub enum AppError {
    Unauthorized { code: &'static str, message: String },
    BadRequest { code: &'static str, message: String },
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Unauthorized { message, .. } => write!(f, "Unauthorized: {message}"),
            AppError::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthorized { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "success": false, "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::Internal(err.to_string())
    }
}
