use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{error::ApiError, AppState};
use crate::error::MIN_CONTEXT_CHARS;
use crate::question::Question;

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.provider_name(),
    }))
}

/// `OPTIONS /api/generate-quiz`; the CORS headers come from the router middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any method other than POST and OPTIONS on the generation endpoint.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Pull a usable context out of a raw request body.
///
/// The body is taken as bytes rather than through axum's `Json` extractor: a body
/// that is not JSON at all is a 500, while a missing, non-string or short `context`
/// is a 400.
pub fn context_from_body(body: &[u8]) -> Result<String, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::UnparsableBody(e.to_string()))?;
    let context = value
        .get("context")
        .and_then(Value::as_str)
        .ok_or(ApiError::InvalidContext)?;

    if context.trim().chars().count() < MIN_CONTEXT_CHARS {
        return Err(ApiError::InvalidContext);
    }
    Ok(context.to_string())
}

/// `POST /api/generate-quiz`
#[instrument(skip_all, fields(body_len = body.len()))]
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<Question>>, ApiError> {
    let context = context_from_body(&body)?;
    let generator = state.generator().ok_or(ApiError::MissingCredential)?;

    let questions = generator.generate(&context).await?;
    info!(count = questions.len(), "Returning generated quiz");
    Ok(Json(questions))
}
