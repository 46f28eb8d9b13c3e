//! End-to-end router tests over `tower::ServiceExt::oneshot`.
//!
//! These run with identity verification disabled (no client id) and no
//! upstream API key, which exercises the anon namespace and the
//! configuration-error paths without network access.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use popmodel_core::gateway::ChatGateway;
use popmodel_infra::llm::anthropic::AnthropicClient;

use crate::http::rate_limit::RateLimiter;
use crate::http::router::build_router;
use crate::state::{AppState, ServerConfig};

const TEST_ADMIN_CODE: &str = "test-code";

async fn test_state(data_dir: &TempDir) -> AppState {
    AppState::init(ServerConfig {
        api_key: None,
        default_model: "claude-3-5-sonnet-latest".to_string(),
        google_client_id: None,
        allow_insecure_noauth: false,
        admin_code: TEST_ADMIN_CODE.to_string(),
        data_dir: data_dir.path().to_path_buf(),
    })
    .await
    .unwrap()
}

async fn test_router(data_dir: &TempDir) -> Router {
    build_router(test_state(data_dir).await)
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(path: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn config_reflects_disabled_auth() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router.oneshot(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authRequired"], false);
    assert_eq!(body["model"], "claude-3-5-sonnet-latest");
    assert_eq!(body["defaultModel"], "claude-3-5-sonnet-latest");
    assert!(body["clientId"].is_null());
}

#[tokio::test]
async fn models_lists_the_catalog() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router.oneshot(get("/api/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 3);
    assert_eq!(models[0]["label"], "pop v1");
    assert_eq!(body["current"], "claude-3-5-sonnet-latest");
}

#[tokio::test]
async fn set_model_accepts_labels_and_rejects_unknowns() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router
        .clone()
        .oneshot(post_json("/api/config/model", json!({"model": "pop v1.5"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["model"], "claude-3-sonnet-20240229");

    let response = router
        .oneshot(post_json("/api/config/model", json!({"model": "gpt-4"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn admin_login_gates_on_the_shared_code() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router
        .clone()
        .oneshot(post_json("/api/admin/login", json!({"code": "wrong"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Forbidden");

    let response = router
        .oneshot(post_json("/api/admin/login", json!({"code": TEST_ADMIN_CODE})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn history_crud_round_trips() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    // Create.
    let response = router
        .clone()
        .oneshot(post_json("/api/history/new", json!({"title": "Trip notes"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Trip notes");

    // List.
    let response = router.clone().oneshot(get("/api/history")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    // Get.
    let response = router
        .clone()
        .oneshot(get(&format!("/api/history/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);

    // Rename with an empty title fails.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/history/{id}/rename"),
            json!({"title": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rename.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/history/{id}/rename"),
            json!({"title": "Renamed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Renamed");

    // Delete, twice (idempotent).
    let response = router
        .clone()
        .oneshot(delete(&format!("/api/history/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = router
        .clone()
        .oneshot(delete(&format!("/api/history/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone.
    let response = router
        .oneshot(get(&format!("/api/history/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_clear_reports_the_count() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(post_json("/api/history/new", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .clone()
        .oneshot(post_json("/api/history/clear", json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["cleared"], 2);

    let response = router
        .oneshot(post_json("/api/history/clear", json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["cleared"], 0);
}

#[tokio::test]
async fn memory_clear_succeeds() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router
        .oneshot(post_json("/api/memory/clear", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn empty_message_is_rejected_before_the_credential_check() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router
        .oneshot(post_json("/api/message", json!({"message": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ValidationError");

    // No session was created as a side effect.
    assert!(
        std::fs::read_dir(dir.path().join("history").join("anon"))
            .map(|mut d| d.next().is_none())
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn message_without_api_key_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router
        .oneshot(post_json("/api/message", json!({"message": "hello"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ConfigurationError");
}

#[tokio::test]
async fn message_endpoint_is_rate_limited() {
    let dir = TempDir::new().unwrap();
    let mut state = test_state(&dir).await;
    state.rate_limiter = Arc::new(RateLimiter::new(Duration::from_secs(300), 1));
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(post_json("/api/message", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(post_json("/api/message", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"], "RateLimited");
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir).await;

    let response = router.oneshot(get("/api/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn sessions_persist_across_router_rebuilds() {
    let dir = TempDir::new().unwrap();

    let router = test_router(&dir).await;
    let response = router
        .oneshot(post_json("/api/history/new", json!({"title": "Durable"})))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Fresh state over the same data directory sees the session.
    let router = test_router(&dir).await;
    let response = router
        .oneshot(get(&format!("/api/history/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Serve a canned Messages API reply on an ephemeral local port.
async fn spawn_upstream_stub(reply: &'static str) -> String {
    let stub = Router::new().route(
        "/v1/messages",
        axum::routing::post(move || async move {
            axum::Json(json!({"content": [{"type": "text", "text": reply}]}))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, stub).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn message_appends_the_exchange_and_auto_titles() {
    let dir = TempDir::new().unwrap();
    let mut state = test_state(&dir).await;
    let base_url = spawn_upstream_stub("Hi! How can I help?").await;
    state.gateway = Some(Arc::new(ChatGateway::new(
        AnthropicClient::new(SecretString::from("test-key")).with_base_url(base_url),
    )));
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(post_json("/api/message", json!({"message": "hello there"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reply"], "Hi! How can I help?");
    assert_eq!(body["admin"], false);
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    // Exactly one user and one assistant message, auto-titled from the
    // prompt.
    let response = router
        .clone()
        .oneshot(get(&format!("/api/history/{session_id}")))
        .await
        .unwrap();
    let session = body_json(response).await;
    assert_eq!(session["title"], "hello there");
    let messages = session["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["text"], "hello there");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["text"], "Hi! How can I help?");

    // A follow-up in the same session appends without retitling.
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/message",
            json!({"message": "tell me another thing", "sessionId": session_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sessionId"].as_str().unwrap(), session_id);

    let response = router
        .oneshot(get(&format!("/api/history/{session_id}")))
        .await
        .unwrap();
    let session = body_json(response).await;
    assert_eq!(session["title"], "hello there");
    assert_eq!(session["messages"].as_array().unwrap().len(), 4);
}
