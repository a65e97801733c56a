#![forbid(unsafe_code)]

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ng_storage::StoreError;
use serde_json::json;
use thiserror::Error;

/// Handler failure. Renders as `{"message": ...}` with the matching status;
/// internal details are logged and never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status only, for endpoints that answer errors without a body. Internal
    /// failures are still logged.
    pub fn into_bare_status(self) -> StatusCode {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        self.status()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("Not found".to_string()),
            StoreError::AlreadyExists => Self::Conflict("Resource already exists".to_string()),
            StoreError::UnknownUser => Self::Unauthorized("User not authenticated"),
            StoreError::InvalidInput(message) if is_reset_required(message) => {
                Self::Internal(message.to_string())
            }
            StoreError::InvalidInput(message) => Self::BadRequest(message.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

fn is_reset_required(message: &str) -> bool {
    message.starts_with("RESET_REQUIRED")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal Server Error".to_string()
            }
            Self::Unauthorized(message) => message.to_string(),
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::PayloadTooLarge(message) => message,
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(AppError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(StoreError::AlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StoreError::InvalidInput("title is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::UnknownUser).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(StoreError::InvalidInput("RESET_REQUIRED: schema version mismatch"))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_stay_out_of_the_body() {
        let response = AppError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
