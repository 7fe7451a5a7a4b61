//! API error type and its HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use guardz_compiler::GuardzError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const MISSING_FILES_MESSAGE: &str = "Files array is required and must contain at least one file";

/// Errors a handler can return.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", MISSING_FILES_MESSAGE)]
    MissingFiles,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Compiler(#[from] GuardzError),

    #[error("Failed to prepare request workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("{operation} failed: {message}")]
    StageFailed {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFiles | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Compiler(
                GuardzError::AmbiguousGuardName { .. } | GuardzError::InvalidGuardName { .. },
            ) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_input_errors_are_bad_requests() {
        assert_eq!(ApiError::MissingFiles.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidBody("x".into()).status(), StatusCode::BAD_REQUEST);
        let ambiguous = ApiError::from(GuardzError::AmbiguousGuardName {
            guard_name: "check".into(),
            count: 2,
        });
        assert_eq!(ambiguous.status(), StatusCode::BAD_REQUEST);
        let invalid = ApiError::from(GuardzError::InvalidGuardName {
            guard_name: "../escaped".into(),
        });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_toolchain_errors_are_internal() {
        let setup = ApiError::from(GuardzError::setup("no source files to compile"));
        assert_eq!(setup.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(setup.to_string(), "Failed to create program: no source files to compile");

        let format = ApiError::from(GuardzError::FormatFailed {
            path: PathBuf::from("a.json"),
            message: "EOF".into(),
        });
        assert_eq!(format.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let timeout = ApiError::Timeout {
            operation: "generate",
            seconds: 60,
        };
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_files_message() {
        assert_eq!(ApiError::MissingFiles.to_string(), MISSING_FILES_MESSAGE);
    }
}
