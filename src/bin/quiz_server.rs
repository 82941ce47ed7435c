use clap::Parser;
use quiz_forge::config::ServerConfig;
use quiz_forge::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Quiz generation backend", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    GEMINI_API_KEY     API key for Gemini (API_KEY is also accepted)
    ANTHROPIC_API_KEY  API key for Claude
    DEEPSEEK_API_KEY   API key for DeepSeek
    RUST_LOG           Log filter [default: quiz_forge=info,tower_http=info]

EXAMPLES:
    quiz-server                          # Auto-detect provider from API keys
    quiz-server --provider mock          # Serve a canned quiz, no API calls
    quiz-server --transcripts ./logs     # Save every prompt and response")]
struct Args {
    #[command(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_forge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(bind = %args.server.bind, "Starting quiz backend");
    server::serve(args.server).await?;
    Ok(())
}
