use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, DeepSeekError};
use crate::prompt::SYSTEM_PROMPT;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const CHAT_COMPLETIONS_URL: &str = "https://api.deepseek.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, DeepSeekError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DeepSeekError::Api("No choices in response".to_string()))?;
        if choice.finish_reason.as_deref() == Some("length") {
            warn!("DeepSeek hit the token limit; the quiz is probably truncated");
        }
        Ok(choice.message.content)
    }
}

fn status_error(status: StatusCode, body: String) -> DeepSeekError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("DeepSeek API rate limit exceeded");
            DeepSeekError::RateLimit
        }
        StatusCode::UNAUTHORIZED => {
            error!("DeepSeek API authentication failed");
            DeepSeekError::Authentication
        }
        _ => {
            error!(status = %status, error = %body, "DeepSeek API error");
            DeepSeekError::Api(body)
        }
    }
}

/// Configuration for DeepSeek client
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model, "Creating new DeepSeek client");
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::find_key().ok_or(DeepSeekError::Authentication)?;
        Ok(Self::new(DeepSeekConfig {
            api_key,
            ..DeepSeekConfig::default()
        }))
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.model = model;
        self
    }
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to DeepSeek API");
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                DeepSeekError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse DeepSeek response JSON");
            DeepSeekError::Http(e.to_string())
        })?;

        let text = parsed.into_text()?;
        info!(response_len = text.len(), "Received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
