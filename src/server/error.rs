use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::QuizGeneratorError;

/// Failures of the generation endpoint, each mapped to a status and `{ "error": … }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid context provided. Must be a string with at least 50 characters.")]
    InvalidContext,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Server configuration error. API key is missing.")]
    MissingCredential,
    #[error("Failed to generate quiz from AI: {0}")]
    Generation(#[from] QuizGeneratorError),
    #[error("Failed to generate quiz from AI: {0}")]
    UnparsableBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidContext => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingCredential | Self::Generation(_) | Self::UnparsableBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Quiz generation request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Rejected quiz generation request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
