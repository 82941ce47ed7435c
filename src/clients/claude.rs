use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, ClaudeError};
use crate::prompt::SYSTEM_PROMPT;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Assistant prefill: the reply is forced to continue a JSON array.
const PREFILL: &str = "[";

pub struct ClaudeModels;

impl ClaudeModels {
    pub const SONNET_4: &'static str = "claude-sonnet-4-20250514";
    pub const HAIKU_3_5_LATEST: &'static str = "claude-3-5-haiku-latest";
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: [Turn<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl MessagesResponse {
    /// The full array text: prefill plus every text block.
    fn into_quiz_text(self) -> String {
        if self.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Claude stopped at max_tokens; the quiz is probably truncated");
        }
        std::iter::once(PREFILL.to_string())
            .chain(self.content.into_iter().map(|block| block.text))
            .collect()
    }
}

fn status_error(status: StatusCode, body: String) -> ClaudeError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Anthropic API rate limit exceeded");
            ClaudeError::RateLimit
        }
        StatusCode::UNAUTHORIZED => {
            error!("Anthropic API authentication failed");
            ClaudeError::Authentication
        }
        _ => {
            error!(status = %status, error = %body, "Anthropic API error");
            ClaudeError::Api(body)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: ClaudeModels::HAIKU_3_5_LATEST.to_string(),
            max_tokens: 4096,
            temperature: 0.4,
        }
    }
}

/// Anthropic Messages API client.
#[derive(Clone, Debug)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model, "Creating new Claude client");
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a Claude client reading ANTHROPIC_API_KEY from environment/.env
    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::find_key().ok_or(ClaudeError::Authentication)?;
        Ok(Self::new(ClaudeConfig {
            api_key,
            ..ClaudeConfig::default()
        }))
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.model = model;
        self
    }
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            temperature: self.config.temperature,
            messages: [
                Turn { role: "user", content: &prompt },
                Turn { role: "assistant", content: PREFILL },
            ],
        };

        debug!("Sending request to Anthropic API");
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ClaudeError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Anthropic response JSON");
            ClaudeError::Http(e.to_string())
        })?;

        let text = parsed.into_quiz_text();
        info!(response_len = text.len(), "Received Anthropic response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
