use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, GeminiError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(reason));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::Api("No candidates in response".to_string()))?;
        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

fn status_error(status: StatusCode, body: String) -> GeminiError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Gemini API rate limit exceeded");
            GeminiError::RateLimit
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!("Gemini API authentication failed");
            GeminiError::Authentication
        }
        _ => {
            error!(status = %status, error = %body, "Gemini API error");
            GeminiError::Api(body)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            temperature: None,
        }
    }
}

/// Google Gemini client. Structured requests use native JSON schema output instead
/// of prompt guidance.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl KeyFromEnv for GeminiClient {
    const KEY_NAME: &'static str = "GEMINI_API_KEY";
    const FALLBACK_KEY_NAMES: &'static [&'static str] = &["API_KEY"];
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        info!(model = %config.model, "Creating new Gemini client");
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::find_key().ok_or(GeminiError::Authentication)?;
        Ok(Self::new(GeminiConfig {
            api_key,
            ..GeminiConfig::default()
        }))
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.model = model;
        self
    }

    fn request_body(&self, prompt: String, schema: Option<&serde_json::Value>) -> serde_json::Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = self.config.temperature {
            generation_config.insert("temperature".into(), temperature.into());
        }
        if let Some(schema) = schema {
            let mut schema = schema.clone();
            if let Some(obj) = schema.as_object_mut() {
                obj.remove("$schema");
            }
            generation_config.insert("responseMimeType".into(), "application/json".into());
            generation_config.insert("responseJsonSchema".into(), schema);
        }

        serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": generation_config,
        })
    }

    #[instrument(skip(self, body), fields(model = %self.config.model))]
    async fn generate_content(&self, body: serde_json::Value) -> Result<String, AIError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.config.model);

        debug!("Sending request to Gemini API");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                GeminiError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response JSON");
            AIError::Gemini(GeminiError::Http(e.to_string()))
        })?;

        let text = gemini_response.into_text()?;
        info!(response_len = text.len(), "Successfully received Gemini response");
        Ok(text)
    }
}

#[async_trait]
impl LowLevelClient for GeminiClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let body = self.request_body(prompt, None);
        self.generate_content(body).await
    }

    async fn ask_structured(
        &self,
        prompt: String,
        schema: &serde_json::Value,
    ) -> Result<String, AIError> {
        let body = self.request_body(prompt, Some(schema));
        self.generate_content(body).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
