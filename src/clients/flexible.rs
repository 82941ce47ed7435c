use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::AIError;
use tracing::info;

#[cfg(feature = "anthropic")]
use super::claude::ClaudeClient;
#[cfg(feature = "deepseek")]
use super::deepseek::DeepSeekClient;
#[cfg(feature = "gemini")]
use super::gemini::GeminiClient;
use super::mock::MockClient;

/// Model provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    #[cfg(feature = "gemini")]
    Gemini,
    #[cfg(feature = "anthropic")]
    Claude,
    #[cfg(feature = "deepseek")]
    DeepSeek,
    Mock,
}

impl ClientType {
    /// Parse client type from string (case insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            #[cfg(feature = "gemini")]
            "gemini" => Ok(Self::Gemini),
            #[cfg(feature = "anthropic")]
            "claude" | "anthropic" => Ok(Self::Claude),
            #[cfg(feature = "deepseek")]
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(format!(
                "Unknown client type: '{}'. Supported: gemini, claude, deepseek, mock",
                s
            )),
        }
    }

    /// First provider with an API key available, in order of preference.
    /// `None` means no credential is configured at all.
    pub fn detect() -> Option<Self> {
        #[cfg(feature = "gemini")]
        if GeminiClient::has_key() {
            return Some(Self::Gemini);
        }
        #[cfg(feature = "anthropic")]
        if ClaudeClient::has_key() {
            return Some(Self::Claude);
        }
        #[cfg(feature = "deepseek")]
        if DeepSeekClient::has_key() {
            return Some(Self::DeepSeek);
        }
        None
    }

    /// Build a client for this provider, reading its key from the environment.
    ///
    /// Fails with the provider's authentication error when the key is missing.
    pub fn connect(self, model: Option<String>) -> Result<Box<dyn LowLevelClient>, AIError> {
        info!(provider = %self, model = ?model, "Connecting model provider");
        let client: Box<dyn LowLevelClient> = match self {
            #[cfg(feature = "gemini")]
            Self::Gemini => {
                let client = GeminiClient::from_env()?;
                Box::new(match model {
                    Some(m) => client.with_model(m),
                    None => client,
                })
            }
            #[cfg(feature = "anthropic")]
            Self::Claude => {
                let client = ClaudeClient::from_env()?;
                Box::new(match model {
                    Some(m) => client.with_model(m),
                    None => client,
                })
            }
            #[cfg(feature = "deepseek")]
            Self::DeepSeek => {
                let client = DeepSeekClient::from_env()?;
                Box::new(match model {
                    Some(m) => client.with_model(m),
                    None => client,
                })
            }
            Self::Mock => Box::new(MockClient::demo().0),
        };
        Ok(client)
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "gemini")]
            ClientType::Gemini => write!(f, "gemini"),
            #[cfg(feature = "anthropic")]
            ClientType::Claude => write!(f, "claude"),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => write!(f, "deepseek"),
            ClientType::Mock => write!(f, "mock"),
        }
    }
}
