// SPDX-License-Identifier: MIT

//! Draft post CRUD routes. All post access is scoped to the owning user.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Post, PostStatus};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Listing cap, newest first.
const MAX_POSTS_PER_LIST: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[derive(Deserialize, Validate)]
struct PostCreateRequest {
    #[validate(length(min = 1))]
    caption: String,
    image_url: Option<String>,
    #[serde(default)]
    boards: Vec<String>,
    scheduled_time: Option<String>,
    #[serde(default)]
    ai_generated_caption: bool,
    #[serde(default)]
    ai_generated_image: bool,
}

#[derive(Deserialize)]
struct PostUpdateRequest {
    caption: Option<String>,
    image_url: Option<String>,
    boards: Option<Vec<String>>,
    scheduled_time: Option<String>,
}

#[derive(Serialize)]
struct PostResponse {
    post: Post,
    message: String,
}

#[derive(Serialize)]
struct PostListResponse {
    posts: Vec<Post>,
}

/// Fetch a post owned by the authenticated user, or 404.
async fn owned_post(state: &AppState, auth: &AuthUser, post_id: &str) -> Result<Post> {
    state
        .db
        .get_post(post_id)
        .await?
        .filter(|post| post.user_id == auth.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))
}

/// List the user's posts, newest first.
async fn list_posts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PostListResponse>> {
    let posts = state
        .db
        .get_posts_for_user(&auth.user_id, MAX_POSTS_PER_LIST)
        .await?;
    Ok(Json(PostListResponse { posts }))
}

/// Create a draft (or scheduled, when a time is given) post.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<Json<PostResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let status = if payload.scheduled_time.is_some() {
        PostStatus::Scheduled
    } else {
        PostStatus::Draft
    };

    let now = now_rfc3339();
    let post = Post {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: auth.user_id.clone(),
        caption: payload.caption,
        image_url: payload.image_url,
        boards: payload.boards,
        scheduled_time: payload.scheduled_time,
        status,
        ai_generated_caption: payload.ai_generated_caption,
        ai_generated_image: payload.ai_generated_image,
        pinterest_pin_ids: Vec::new(),
        published_boards: Vec::new(),
        published_at: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_post(&post).await?;

    Ok(Json(PostResponse {
        post,
        message: "Post created successfully".to_string(),
    }))
}

/// Get one post.
async fn get_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>> {
    let post = owned_post(&state, &auth, &post_id).await?;
    Ok(Json(PostResponse {
        post,
        message: "OK".to_string(),
    }))
}

/// Update draft fields. The lifecycle status is not writable here; it only
/// moves forward through publishing.
async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<Json<PostResponse>> {
    let mut post = owned_post(&state, &auth, &post_id).await?;

    if let Some(caption) = payload.caption {
        if caption.is_empty() {
            return Err(AppError::Validation("Caption must not be empty".to_string()));
        }
        post.caption = caption;
    }
    if let Some(image_url) = payload.image_url {
        post.image_url = Some(image_url);
    }
    if let Some(boards) = payload.boards {
        post.boards = boards;
    }
    if let Some(scheduled_time) = payload.scheduled_time {
        post.scheduled_time = Some(scheduled_time);
        if post.status == PostStatus::Draft {
            post.status = PostStatus::Scheduled;
        }
    }

    post.updated_at = now_rfc3339();
    state.db.upsert_post(&post).await?;

    Ok(Json(PostResponse {
        post,
        message: "Post updated successfully".to_string(),
    }))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

/// Delete one post.
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    // Ownership check before the delete; the delete itself is by ID
    let post = owned_post(&state, &auth, &post_id).await?;
    state.db.delete_post(&post.id).await?;

    Ok(Json(DeleteResponse {
        message: "Post deleted successfully".to_string(),
    }))
}
