mod test_utils;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use quiz_forge::clients::MockResponse;
use quiz_forge::server::{create_router, AppState, GENERATE_QUIZ_PATH};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::test_utils::{mock_state, quiz_json, CONTEXT};

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(GENERATE_QUIZ_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn generates_quiz_from_context() {
    let (state, handle) = mock_state(vec![MockResponse::Text(quiz_json(6).to_string())]);

    let (status, headers, body) = send(create_router(state), post_json(json!({ "context": CONTEXT }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 6);
    for q in questions {
        assert_eq!(q["options"].as_array().unwrap().len(), 4);
        assert!(q["correctAnswerIndex"].as_u64().unwrap() <= 3);
        assert!(q["questionText"].is_string());
        assert!(q["explanation"].is_string());
    }
    assert!(handle.prompts()[0].contains(CONTEXT));
}

#[tokio::test]
async fn short_context_is_rejected_without_calling_the_model() {
    let (state, handle) = mock_state(vec![MockResponse::Text(quiz_json(5).to_string())]);

    let (status, _, body) = send(
        create_router(state),
        post_json(json!({ "context": "Too short to be a quiz." })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid context provided. Must be a string with at least 50 characters."
    );
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn non_string_context_is_rejected() {
    let (state, _) = mock_state(vec![]);
    let (status, _, _) = send(create_router(state), post_json(json!({ "context": 12345 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparsable_body_is_a_server_error() {
    let (state, handle) = mock_state(vec![]);
    let request = Request::builder()
        .method("POST")
        .uri(GENERATE_QUIZ_PATH)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send(create_router(state), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate quiz from AI: "));
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn missing_context_field_is_a_bad_request() {
    let (state, _) = mock_state(vec![]);
    let (status, _, body) = send(create_router(state), post_json(json!({ "text": CONTEXT }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid context provided. Must be a string with at least 50 characters."
    );
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let (state, _) = mock_state(vec![]);
    let request = Request::builder()
        .method("GET")
        .uri(GENERATE_QUIZ_PATH)
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(create_router(state), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
}

#[tokio::test]
async fn preflight_returns_cors_headers() {
    let (state, _) = mock_state(vec![]);
    let request = Request::builder()
        .method("OPTIONS")
        .uri(GENERATE_QUIZ_PATH)
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(create_router(state), request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn model_failure_is_wrapped() {
    let (state, _) = mock_state(vec![MockResponse::Error("quota exhausted".into())]);

    let (status, _, body) = send(create_router(state), post_json(json!({ "context": CONTEXT }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to generate quiz from AI:"));
    assert!(message.contains("quota exhausted"));
}

#[tokio::test]
async fn object_response_is_an_unexpected_format() {
    let (state, _) = mock_state(vec![MockResponse::Text(r#"{"questions": []}"#.into())]);

    let (status, _, body) = send(create_router(state), post_json(json!({ "context": CONTEXT }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Failed to generate quiz from AI: AI returned data in an unexpected format."
    );
}

#[tokio::test]
async fn malformed_question_is_rejected() {
    let mut quiz = quiz_json(5);
    quiz[2]["options"] = json!(["only", "three", "options"]);
    let (state, _) = mock_state(vec![MockResponse::Text(quiz.to_string())]);

    let (status, _, body) = send(create_router(state), post_json(json!({ "context": CONTEXT }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Question 2"));
}

#[tokio::test]
async fn missing_credential_is_a_configuration_error() {
    let state = Arc::new(AppState::unconfigured());

    let (status, _, body) = send(create_router(state), post_json(json!({ "context": CONTEXT }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error. API key is missing.");
}

#[tokio::test]
async fn health_reports_provider() {
    let (state, _) = mock_state(vec![]);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, _, body) = send(create_router(state), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "provider": "mock" }));
}
