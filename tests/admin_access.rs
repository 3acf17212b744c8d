mod common;

use chrono::Utc;
use common::{TEST_JWT_SECRET, build_test_context, login, sample_submission, send_request, submit};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use resident_registry::service::admin_auth_service::AdminClaims;
use serde_json::json;

#[tokio::test]
async fn wrong_password_is_rejected() {
    let ctx = build_test_context();
    let (status, payload) = send_request(
        &ctx.app,
        "POST",
        "/api/admin/login",
        None,
        Some(&json!({ "password": "nope" })),
    )
    .await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], json!("AUTH_INCORRECT_PASSWORD"));
    assert!(payload["token"].is_null());
}

#[tokio::test]
async fn missing_password_is_a_bad_request() {
    let ctx = build_test_context();
    let (status, payload) =
        send_request(&ctx.app, "POST", "/api/admin/login", None, Some(&json!({}))).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(payload["error_code"], json!("AUTH_PASSWORD_REQUIRED"));
}

#[tokio::test]
async fn listing_requires_a_token() {
    let ctx = build_test_context();
    let (status, payload) = send_request(&ctx.app, "GET", "/api/admin/users", None, None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], json!("AUTH_TOKEN_REQUIRED"));
}

#[tokio::test]
async fn listing_masks_mynumber_and_paginates() {
    let ctx = build_test_context();
    submit(&ctx.app, &sample_submission("123456789012")).await;

    let token = login(&ctx.app).await;
    let (status, payload) =
        send_request(&ctx.app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::OK);

    let users = payload["data"]["users"].as_array().expect("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["mynumber"], json!("1234****9012"));
    assert_eq!(users[0]["name"], json!("山田太郎"));
    assert!(users[0]["age"].as_i64().expect("derived age") >= 34);

    let pagination = &payload["data"]["pagination"];
    assert_eq!(pagination["page"], json!(1));
    assert_eq!(pagination["total"], json!(1));
    assert_eq!(pagination["pages"], json!(1));
}

#[tokio::test]
async fn listing_is_newest_first_with_page_windows() {
    let ctx = build_test_context();
    for (i, mynumber) in ["111111111111", "222222222222", "333333333333"]
        .iter()
        .enumerate()
    {
        let mut body = sample_submission(mynumber);
        body["name"] = json!(format!("登録者{i}"));
        let (status, _) = submit(&ctx.app, &body).await;
        assert_eq!(status, http::StatusCode::CREATED);
    }

    let token = login(&ctx.app).await;
    let (_, page1) = send_request(
        &ctx.app,
        "GET",
        "/api/admin/users?page=1&limit=2",
        Some(&token),
        None,
    )
    .await;
    let users = page1["data"]["users"].as_array().expect("users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], json!("登録者2"));
    assert_eq!(page1["data"]["pagination"]["pages"], json!(2));

    let (_, page2) = send_request(
        &ctx.app,
        "GET",
        "/api/admin/users?page=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(page2["data"]["users"].as_array().expect("users").len(), 1);
}

#[tokio::test]
async fn page_number_past_i64_range_is_an_empty_page() {
    let ctx = build_test_context();
    submit(&ctx.app, &sample_submission("888888888888")).await;

    let token = login(&ctx.app).await;
    let uri = format!("/api/admin/users?page={}&limit=2", i64::MAX);
    let (status, payload) = send_request(&ctx.app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(payload["data"]["users"].as_array().expect("users").is_empty());
    assert_eq!(payload["data"]["pagination"]["total"], json!(1));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let ctx = build_test_context();
    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        role: "admin".to_string(),
        email: "admin@example.com".to_string(),
        iat: now - 100,
        exp: now - 50,
        iss: "resident-registry".to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token");

    let (status, payload) =
        send_request(&ctx.app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], json!("AUTH_INVALID_TOKEN"));
}

#[tokio::test]
async fn token_at_its_exact_expiry_instant_is_rejected() {
    let ctx = build_test_context();
    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        role: "admin".to_string(),
        email: "admin@example.com".to_string(),
        iat: now - 3600,
        exp: now,
        iss: "resident-registry".to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token");

    let (status, payload) =
        send_request(&ctx.app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], json!("AUTH_INVALID_TOKEN"));
}

#[tokio::test]
async fn non_admin_role_is_forbidden() {
    let ctx = build_test_context();
    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        role: "viewer".to_string(),
        email: "viewer@example.com".to_string(),
        iat: now,
        exp: now + 3600,
        iss: "resident-registry".to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token");

    let (status, payload) =
        send_request(&ctx.app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    assert_eq!(payload["error_code"], json!("AUTH_ROLE_REQUIRED"));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let ctx = build_test_context();
    let mut token = login(&ctx.app).await;
    token.push('x');
    let (status, _) = send_request(&ctx.app, "GET", "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_stats_count_all_windows() {
    let ctx = build_test_context();
    submit(&ctx.app, &sample_submission("444444444444")).await;
    submit(&ctx.app, &sample_submission("555555555555")).await;

    let token = login(&ctx.app).await;
    let (status, payload) =
        send_request(&ctx.app, "GET", "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(payload["data"]["total"], json!(2));
    assert_eq!(payload["data"]["today"], json!(2));
    assert_eq!(payload["data"]["last7Days"], json!(2));
    assert_eq!(payload["data"]["last30Days"], json!(2));
}

#[tokio::test]
async fn delete_removes_record_and_unknown_id_is_not_found() {
    let ctx = build_test_context();
    let (_, created) = submit(&ctx.app, &sample_submission("666666666666")).await;
    let record_id = created["data"]["id"].as_str().expect("record id").to_string();

    let token = login(&ctx.app).await;
    let (missing_status, missing) = send_request(
        &ctx.app,
        "DELETE",
        "/api/admin/users/rec-does-not-exist",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(missing_status, http::StatusCode::NOT_FOUND);
    assert_eq!(missing["error_code"], json!("RECORD_NOT_FOUND"));

    let (status, payload) = send_request(
        &ctx.app,
        "DELETE",
        &format!("/api/admin/users/{record_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(payload["success"], json!(true));

    let (_, listing) = send_request(&ctx.app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(listing["data"]["pagination"]["total"], json!(0));
}

#[tokio::test]
async fn csv_export_is_admin_gated_and_masked() {
    let ctx = build_test_context();
    submit(&ctx.app, &sample_submission("777777777777")).await;

    let (status, _) = send_request(&ctx.app, "GET", "/api/admin/users/export", None, None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);

    let token = login(&ctx.app).await;
    let request = http::Request::builder()
        .method("GET")
        .uri("/api/admin/users/export")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::empty())
        .expect("build request");
    let response = tower::util::ServiceExt::oneshot(ctx.app.clone(), request)
        .await
        .expect("request failed");
    assert_eq!(response.status(), http::StatusCode::OK);
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8 csv");
    assert!(csv.contains("7777****7777"));
    assert!(!csv.contains("777777777777"));
}

#[tokio::test]
async fn report_without_relay_is_a_server_error() {
    let ctx = build_test_context();
    let token = login(&ctx.app).await;
    let (status, payload) =
        send_request(&ctx.app, "POST", "/api/email/report", Some(&token), None).await;
    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["error_code"], json!("MAIL_NOT_CONFIGURED"));
}

#[tokio::test]
async fn report_requires_admin_token() {
    let ctx = build_test_context();
    let (status, _) = send_request(&ctx.app, "POST", "/api/email/report", None, None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}
