#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, routing::post, Router};
use quiz_forge::clients::{ClientType, MockClient, MockHandle, MockResponse};
use quiz_forge::core::{LowLevelClient, QuizGenerator};
use quiz_forge::server::{create_router, AppState, GENERATE_QUIZ_PATH};
use serde_json::{json, Value};

/// Context long enough to pass every length check.
pub const CONTEXT: &str = "The water cycle describes how water evaporates from the surface, \
condenses into clouds and returns to the ground as precipitation.";

/// `n` well-formed questions as the model would return them.
pub fn quiz_json(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "questionText": format!("Question {}?", i + 1),
                    "options": ["Evaporation", "Condensation", "Precipitation", "Collection"],
                    "correctAnswerIndex": i % 4,
                    "explanation": format!("Explanation {}", i + 1),
                })
            })
            .collect(),
    )
}

/// Route library logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Backend state around a mock client that replies with `responses` in order.
pub fn mock_state(responses: Vec<MockResponse>) -> (Arc<AppState>, Arc<MockHandle>) {
    init_test_logging();
    let (client, handle) = MockClient::with_responses(responses);
    let client: Box<dyn LowLevelClient> = Box::new(client);
    let state = AppState::new(QuizGenerator::new(client), ClientType::Mock);
    (Arc::new(state), handle)
}

/// Serve `router` on an ephemeral local port and return the generation endpoint URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}{}", addr, GENERATE_QUIZ_PATH)
}

/// Serve the real backend around `state`.
pub async fn spawn_server(state: Arc<AppState>) -> String {
    spawn_router(create_router(state)).await
}

/// A backend that answers every generation request with `status` and `body` verbatim,
/// without any validation of its own.
pub fn raw_backend(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(GENERATE_QUIZ_PATH, post(move || async move { (status, body) }))
}
