//! Generation backend: a single JSON endpoint in front of the model provider.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::clients::ClientType;
use crate::config::ServerConfig;
use crate::core::{LowLevelClient, QuizGenerator};
use crate::interceptors::FileInterceptor;

pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Route of the quiz generation endpoint.
pub const GENERATE_QUIZ_PATH: &str = "/api/generate-quiz";

/// Shared backend state. `generator` is `None` when no provider credential is configured;
/// requests then fail with a configuration error instead of the server refusing to start.
#[derive(Debug, Clone)]
pub struct AppState {
    generator: Option<QuizGenerator<Box<dyn LowLevelClient>>>,
    provider: Option<ClientType>,
}

impl AppState {
    pub fn new(generator: QuizGenerator<Box<dyn LowLevelClient>>, provider: ClientType) -> Self {
        Self {
            generator: Some(generator),
            provider: Some(provider),
        }
    }

    /// State for a server with no usable credential.
    pub fn unconfigured() -> Self {
        Self {
            generator: None,
            provider: None,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let Some(provider) = config.provider.or_else(ClientType::detect) else {
            warn!("No model provider API key found; generation requests will fail");
            return Self::unconfigured();
        };

        let client = match provider.connect(config.model.clone()) {
            Ok(client) => client,
            Err(e) => {
                error!(provider = %provider, error = %e, "API key environment variable not set on the server");
                return Self::unconfigured();
            }
        };

        let mut generator = QuizGenerator::new(client);
        if let Some(dir) = &config.transcripts {
            info!(dir = %dir.display(), "Saving generation transcripts");
            generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
        }
        Self::new(generator, provider)
    }

    pub fn generator(&self) -> Option<&QuizGenerator<Box<dyn LowLevelClient>>> {
        self.generator.as_ref()
    }

    pub fn provider_name(&self) -> Option<String> {
        self.provider.map(|p| p.to_string())
    }
}

// Not tower-http's CorsLayer: it answers preflight with 200 and only sends Allow-Methods on preflight.
/// Permissive CORS headers on every response, preflight included.
async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            GENERATE_QUIZ_PATH,
            post(handlers::generate_quiz)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(middleware::from_fn(cors_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind `config.bind` and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "Quiz backend listening");
    axum::serve(listener, app).await
}
