// SPDX-License-Identifier: MIT

//! Pinterest integration routes: OAuth connect flow, credentials, boards,
//! and publishing.

use crate::error::{AppError, Result};
use crate::middleware::auth::{load_user, AuthUser};
use crate::models::{PinterestCredentials, Post};
use crate::services::pinterest::{Board, ConnectStart, ModeInfo};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/pinterest/mode", get(get_mode))
        .route("/api/pinterest/connect", get(connect))
        .route("/api/pinterest/callback", post(callback))
        .route("/api/pinterest/disconnect", post(disconnect))
        .route(
            "/api/pinterest/credentials",
            get(get_credentials)
                .put(save_credentials)
                .delete(delete_credentials),
        )
        .route("/api/pinterest/boards", get(list_boards))
        .route("/api/pinterest/post/{id}", post(publish_post))
}

// ─── Mode & OAuth Flow ───────────────────────────────────────

/// Report the resolved mock/real mode for this user.
async fn get_mode(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ModeInfo>> {
    let user = load_user(&state, &auth).await?;
    Ok(Json(state.pinterest.mode_info(&user)))
}

/// Start the OAuth connect flow.
async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ConnectStart>> {
    let user = load_user(&state, &auth).await?;
    let start = state.pinterest.initiate(&user).await?;
    Ok(Json(start))
}

#[derive(Deserialize)]
struct CallbackRequest {
    code: String,
    state: String,
}

#[derive(Serialize)]
struct CallbackResponse {
    success: bool,
    message: String,
    pinterest_username: Option<String>,
}

/// Complete the OAuth connect flow.
async fn callback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CallbackRequest>,
) -> Result<Json<CallbackResponse>> {
    let user = load_user(&state, &auth).await?;
    let updated = state
        .pinterest
        .complete_callback(&user, &payload.code, &payload.state)
        .await?;

    Ok(Json(CallbackResponse {
        success: true,
        message: "Pinterest connected successfully".to_string(),
        pinterest_username: updated.pinterest_username,
    }))
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

/// Clear the Pinterest linkage. Safe to call when already disconnected.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    let user = load_user(&state, &auth).await?;
    state.pinterest.disconnect(&user).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Pinterest disconnected".to_string(),
    }))
}

// ─── Per-User Credentials ────────────────────────────────────

/// Mask a secret down to its last 4 characters.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[derive(Serialize)]
struct MaskedCredentials {
    app_id: String,
    app_secret: String,
    redirect_uri: Option<String>,
}

#[derive(Serialize)]
struct CredentialsResponse {
    credentials: Option<MaskedCredentials>,
}

/// Return the saved per-user credentials with the secret masked.
async fn get_credentials(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CredentialsResponse>> {
    let user = load_user(&state, &auth).await?;

    let credentials = user
        .pinterest_credentials
        .as_ref()
        .map(|creds| MaskedCredentials {
            app_id: creds.app_id.clone(),
            app_secret: mask_secret(&creds.app_secret),
            redirect_uri: creds.redirect_uri.clone(),
        });

    Ok(Json(CredentialsResponse { credentials }))
}

#[derive(Deserialize)]
struct SaveCredentialsRequest {
    app_id: String,
    app_secret: String,
    redirect_uri: Option<String>,
}

/// Save per-user Pinterest app credentials.
async fn save_credentials(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SaveCredentialsRequest>,
) -> Result<Json<MessageResponse>> {
    if payload.app_id.trim().is_empty() || payload.app_secret.trim().is_empty() {
        return Err(AppError::Validation(
            "Both app_id and app_secret are required".to_string(),
        ));
    }

    let mut user = load_user(&state, &auth).await?;
    user.pinterest_credentials = Some(PinterestCredentials {
        app_id: payload.app_id,
        app_secret: payload.app_secret,
        redirect_uri: payload.redirect_uri,
    });
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Pinterest credentials saved");

    Ok(Json(MessageResponse {
        success: true,
        message: "Credentials saved. Reconnect Pinterest to use the real API.".to_string(),
    }))
}

/// Delete per-user credentials, returning to process-wide configuration.
async fn delete_credentials(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    let mut user = load_user(&state, &auth).await?;
    user.pinterest_credentials = None;
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Credentials deleted".to_string(),
    }))
}

// ─── Boards & Publishing ─────────────────────────────────────

#[derive(Serialize)]
struct BoardsResponse {
    boards: Vec<Board>,
}

/// List the linked account's boards (refresh-guarded).
async fn list_boards(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BoardsResponse>> {
    let mut user = load_user(&state, &auth).await?;
    let boards = state.pinterest.list_boards(&mut user).await?;
    Ok(Json(BoardsResponse { boards }))
}

#[derive(Deserialize)]
struct PublishRequest {
    board_ids: Vec<String>,
}

#[derive(Serialize)]
struct PublishResponse {
    success: bool,
    message: String,
    pin_ids: Vec<String>,
    post: Post,
}

/// Publish a post to the selected boards, one pin per board.
async fn publish_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<PublishResponse>> {
    let user = load_user(&state, &auth).await?;
    let post = state
        .publisher
        .publish(&user, &post_id, &payload.board_ids)
        .await?;

    Ok(Json(PublishResponse {
        success: true,
        message: "Post published to Pinterest successfully".to_string(),
        pin_ids: post.pinterest_pin_ids.clone(),
        post,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_shows_last_four() {
        assert_eq!(mask_secret("supersecretvalue"), "****alue");
    }

    #[test]
    fn test_mask_secret_short_values_fully_masked() {
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret("ab"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
