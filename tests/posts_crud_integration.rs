// SPDX-License-Identifier: MIT

//! Draft post CRUD tests against the Firestore emulator.

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

async fn signup(app: &axum::Router) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let (status, json) = request(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "username": format!("user_{}", &suffix[..12]),
            "email": format!("user_{}@example.com", &suffix[..12]),
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", json);
    json["access_token"].as_str().unwrap().to_string()
}

fn test_app_parts() -> (pinspire::config::Config, pinspire::middleware::RateLimiter) {
    (
        pinspire::config::Config::test_default(),
        pinspire::middleware::RateLimiter::new(10_000, 60),
    )
}

#[tokio::test]
async fn test_create_and_list_posts() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let token = signup(&app).await;

    let (status, json) = request(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(serde_json::json!({
            "caption": "Fresh draft",
            "boards": ["b1"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["post"]["status"], "draft");
    assert_eq!(json["post"]["caption"], "Fresh draft");

    let (status, json) = request(&app, "GET", "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = json["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn test_scheduled_time_sets_scheduled_status() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let token = signup(&app).await;

    let (status, json) = request(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(serde_json::json!({
            "caption": "Later",
            "scheduled_time": "2026-09-01T12:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["post"]["status"], "scheduled");
}

#[tokio::test]
async fn test_update_and_delete_post() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let token = signup(&app).await;

    let (_, json) = request(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(serde_json::json!({"caption": "Before edit"})),
    )
    .await;
    let post_id = json["post"]["id"].as_str().unwrap().to_string();

    let (status, json) = request(
        &app,
        "PUT",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        Some(serde_json::json!({
            "caption": "After edit",
            "image_url": "https://example.com/new.jpg",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["post"]["caption"], "After edit");
    assert_eq!(json["post"]["image_url"], "https://example.com/new.jpg");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posts_are_owner_scoped() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let owner = signup(&app).await;
    let other = signup(&app).await;

    let (_, json) = request(
        &app,
        "POST",
        "/api/posts",
        Some(&owner),
        Some(serde_json::json!({"caption": "Mine"})),
    )
    .await;
    let post_id = json["post"]["id"].as_str().unwrap().to_string();

    // Another user cannot read, update, or delete it
    let uri = format!("/api/posts/{}", post_id);
    let (status, _) = request(&app, "GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PUT",
        &uri,
        Some(&other),
        Some(serde_json::json!({"caption": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still intact for the owner
    let (status, json) = request(&app, "GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["post"]["caption"], "Mine");
}

#[tokio::test]
async fn test_create_post_requires_caption() {
    require_emulator!();
    let (config, limiter) = test_app_parts();
    let (app, _) = common::create_test_app_with(config, common::test_db().await, limiter);
    let token = signup(&app).await;

    let (status, json) = request(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(serde_json::json!({"caption": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}
