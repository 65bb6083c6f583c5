//! Error types for the todonote server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::Serialize;
use thiserror::Error;
use todonote_core::{NoteServiceError, ViewParseError};

/// Result type alias for the server.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur while serving requests or starting up.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Client input was rejected.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown or unparsable note id.
    #[error("Not found")]
    NotFound,

    /// Note store failure reported by the core crate.
    #[error("Storage error: {0}")]
    Storage(#[source] NoteServiceError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Server startup error.
    #[error("Server error: {0}")]
    Server(String),

    /// Internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<NoteServiceError> for ServerError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::NotFound(_) => Self::NotFound,
            NoteServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            err @ NoteServiceError::InvalidTransition { .. } => Self::BadRequest(err.to_string()),
            err @ NoteServiceError::Repo(_) => Self::Storage(err),
        }
    }
}

impl From<ViewParseError> for ServerError {
    fn from(value: ViewParseError) -> Self {
        Self::BadRequest(value.to_string())
    }
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Storage(err) => {
                error!("event=http_error module=server status=error error_code=storage error={err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
            Self::Configuration(_) | Self::Server(_) | Self::Internal(_) => {
                error!(
                    "event=http_error module=server status=error error_code=internal error={}",
                    self
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todonote_core::NoteValidationError;

    #[test]
    fn service_errors_map_to_client_or_server_classes() {
        let missing = todonote_core::NoteId::generate();
        let not_found = ServerError::from(NoteServiceError::NotFound(missing));
        assert!(matches!(not_found, ServerError::NotFound));
        assert_eq!(not_found.to_string(), "Not found");

        let invalid = ServerError::from(NoteServiceError::Validation(
            NoteValidationError::EmptyTitle,
        ));
        assert_eq!(invalid.to_string(), "title required");
    }

    #[test]
    fn responses_carry_error_body_and_status() {
        let response = ServerError::BadRequest("title required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ServerError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_response_serialization() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "Not found".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Not found"}"#);
    }
}
