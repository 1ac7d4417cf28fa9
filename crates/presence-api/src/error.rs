//! Maps [`AppError`] into HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use presence_core::error::{AppError, ErrorKind};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Machine-readable error code.
    error: &'static str,
    /// Human-readable message.
    message: String,
}

/// HTTP status and error code for an error kind.
pub fn status_of(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::Database => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Cache => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
        ErrorKind::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
        ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

/// Newtype so the foreign [`AppError`] can implement [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, code) = status_of(err.kind);

        if status.is_server_error() {
            error!(kind = %err.kind, error = %err, source = ?err.source, "Request failed");
        } else {
            warn!(kind = %err.kind, message = %err.message, "Request rejected");
        }

        // Internal details stay in the logs.
        let message = if status.is_server_error() {
            "The presence service could not complete the request".to_string()
        } else {
            err.message
        };

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_map_to_status_codes() {
        assert_eq!(status_of(ErrorKind::Authentication).0, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ErrorKind::Validation).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ErrorKind::Database),
            (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
        );
        assert_eq!(
            status_of(ErrorKind::ServiceUnavailable).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = ApiError(AppError::database("connection refused on 10.0.0.5")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
