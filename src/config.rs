use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use crate::clients::ClientType;

/// Trait for types that can retrieve their API key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Older or platform-specific names accepted when `KEY_NAME` is unset.
    const FALLBACK_KEY_NAMES: &'static [&'static str] = &[];

    /// Find the API key by checking environment variables, after loading `.env`
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        std::iter::once(Self::KEY_NAME)
            .chain(Self::FALLBACK_KEY_NAMES.iter().copied())
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    fn has_key() -> bool {
        Self::find_key().is_some()
    }
}

/// Settings for the generation backend.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "QUIZ_BIND", default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,

    /// Model provider: gemini, claude, deepseek or mock [default: auto-detect from API keys]
    #[arg(long, env = "QUIZ_PROVIDER", value_parser = ClientType::from_str)]
    pub provider: Option<ClientType>,

    /// Override the provider's default model
    #[arg(long, env = "QUIZ_MODEL")]
    pub model: Option<String>,

    /// Write every prompt/response pair to this directory
    #[arg(long, env = "QUIZ_TRANSCRIPTS")]
    pub transcripts: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            provider: None,
            model: None,
            transcripts: None,
        }
    }
}
