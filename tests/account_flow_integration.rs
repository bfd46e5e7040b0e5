// SPDX-License-Identifier: MIT

//! Account lifecycle tests against the Firestore emulator:
//! signup, duplicate rejection, login, profile and password updates.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn fresh_identity() -> (String, String) {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    (
        format!("user_{}", &suffix[..12]),
        format!("user_{}@example.com", &suffix[..12]),
    )
}

fn test_app_parts() -> (pinspire::config::Config, pinspire::middleware::RateLimiter) {
    (
        pinspire::config::Config::test_default(),
        pinspire::middleware::RateLimiter::new(10_000, 60),
    )
}

#[tokio::test]
async fn test_signup_then_login() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let (username, email) = fresh_identity();

    let (status, json) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["user"]["username"], username);
    assert_eq!(json["user"]["pinterest_connected"], false);

    let (status, json) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["access_token"].as_str().is_some());

    // Wrong password
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": "wrong_password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_signup_rejected() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let (username, email) = fresh_identity();

    let payload = serde_json::json!({
        "username": username,
        "email": email,
        "password": "password123",
    });

    let (status, _) = request(&app, "POST", "/api/auth/signup", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = request(&app, "POST", "/api/auth/signup", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_update_password_flow() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let (username, email) = fresh_identity();

    let (_, json) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    let token = json["access_token"].as_str().unwrap().to_string();

    // Wrong current password
    let (status, _) = request(
        &app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(serde_json::json!({
            "current_password": "not_the_password",
            "new_password": "brand_new_pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct current password
    let (status, _) = request(
        &app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(serde_json::json!({
            "current_password": "password123",
            "new_password": "brand_new_pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, new one does
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": "brand_new_pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let (username, email) = fresh_identity();

    let (_, json) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    let token = json["access_token"].as_str().unwrap().to_string();

    let (new_username, new_email) = fresh_identity();
    let (status, json) = request(
        &app,
        "PUT",
        "/api/auth/update-profile",
        Some(&token),
        Some(serde_json::json!({"username": new_username, "email": new_email})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], new_username);
    assert_eq!(json["email"], new_email);

    // Taking an existing username is rejected
    let (other_username, other_email) = fresh_identity();
    request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": other_username,
            "email": other_email,
            "password": "password123",
        })),
    )
    .await;

    let (status, json) = request(
        &app,
        "PUT",
        "/api/auth/update-profile",
        Some(&token),
        Some(serde_json::json!({"username": other_username})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}
