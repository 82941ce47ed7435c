//! Quiz generation client: talks to the generation backend over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::error::{GenerationError, MIN_CONTEXT_CHARS};
use crate::question::{questions_from_values, Question};

/// Default backend location used by the terminal front end.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/api/generate-quiz";

/// Anything that can turn a context into a question set.
///
/// The session depends on this seam rather than on HTTP so it can run against an
/// in-memory source.
#[async_trait]
pub trait QuizSource: Send + Sync {
    async fn generate(&self, context: &str) -> Result<Vec<Question>, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateQuizRequest<'a> {
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client-side length check shared by every [`QuizSource`].
pub fn check_context(context: &str) -> Result<(), GenerationError> {
    if context.trim().chars().count() < MIN_CONTEXT_CHARS {
        return Err(GenerationError::ContextTooShort);
    }
    Ok(())
}

/// HTTP client for `POST /api/generate-quiz`. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct QuizApiClient {
    endpoint: String,
    http: Client,
}

impl Default for QuizApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl QuizApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuizSource for QuizApiClient {
    #[instrument(skip(self, context), fields(endpoint = %self.endpoint, context_len = context.len()))]
    async fn generate(&self, context: &str) -> Result<Vec<Question>, GenerationError> {
        check_context(context)?;

        debug!("Posting context to quiz backend");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GenerateQuizRequest { context })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Quiz backend request failed");
                GenerationError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(ErrorBody { error: Some(message) }) => message,
                Ok(ErrorBody { error: None }) => {
                    format!("Server responded with status: {}", status.as_u16())
                }
                Err(_) => "An unknown server error occurred.".to_string(),
            };
            error!(status = %status, error = %message, "Quiz backend returned an error");
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            error!(error = %e, "Quiz backend sent an unreadable body");
            GenerationError::MalformedResponse(
                "Received data in an unexpected format from the server.".to_string(),
            )
        })?;

        let serde_json::Value::Array(items) = body else {
            return Err(GenerationError::MalformedResponse(
                "Received data in an unexpected format from the server.".to_string(),
            ));
        };
        if items.is_empty() {
            return Err(GenerationError::EmptyQuiz);
        }

        let questions = questions_from_values(items)?;
        info!(count = questions.len(), "Received quiz");
        Ok(questions)
    }
}
