#![allow(dead_code)]

use http::Request;
use resident_registry::app::{AppState, build_router};
use resident_registry::config::environment::AppConfig;
use serde_json::{Value, json};
use tower::util::ServiceExt;

pub const TEST_ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        mongodb_url: None,
        mongodb_database: None,
        admin_password: TEST_ADMIN_PASSWORD.to_string(),
        admin_email: "admin@example.com".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_token_ttl_seconds: 24 * 60 * 60,
        mail_relay_url: None,
        mail_from: "noreply@example.com".to_string(),
        mail_to: "admin@example.com".to_string(),
    }
}

pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

pub fn build_test_context() -> TestContext {
    let state = AppState::new(test_config(), None);
    let app = build_router(state.clone());
    TestContext { app, state }
}

pub fn sample_submission(mynumber: &str) -> Value {
    json!({
        "name": "山田太郎",
        "birthdate": "1990-01-01",
        "mynumber": mynumber,
        "email": "taro@example.com",
        "phone": "090-1234-5678",
        "address": "東京都千代田区1-1",
        "privacy": true
    })
}

pub async fn send_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (http::StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(value).expect("serialize request"),
            )),
        None => builder.body(axum::body::Body::empty()),
    }
    .expect("build request");

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, payload)
}

pub async fn submit(app: &axum::Router, body: &Value) -> (http::StatusCode, Value) {
    send_request(app, "POST", "/api/users", None, Some(body)).await
}

pub async fn login(app: &axum::Router) -> String {
    let (status, body) = send_request(
        app,
        "POST",
        "/api/admin/login",
        None,
        Some(&json!({ "password": TEST_ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    body["token"].as_str().expect("login token").to_string()
}
