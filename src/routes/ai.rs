// SPDX-License-Identifier: MIT

//! AI generation routes: captions, hashtags, images.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ai/generate-caption", post(generate_caption))
        .route("/api/ai/suggest-hashtags", post(suggest_hashtags))
        .route("/api/ai/generate-image", post(generate_image))
}

fn default_tone() -> String {
    "engaging".to_string()
}

fn default_style() -> String {
    "professional".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_quality() -> String {
    "standard".to_string()
}

#[derive(Deserialize)]
struct CaptionRequest {
    topic: String,
    #[serde(default = "default_tone")]
    tone: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Deserialize)]
struct ImageGenerationRequest {
    prompt: String,
    #[serde(default = "default_style")]
    style: String,
    #[serde(default = "default_size")]
    size: String,
    #[serde(default = "default_quality")]
    quality: String,
}

#[derive(Serialize)]
struct CaptionResponse {
    caption: String,
    success: bool,
}

#[derive(Serialize)]
struct HashtagsResponse {
    hashtags: Vec<String>,
    success: bool,
}

#[derive(Serialize)]
struct ImageResponse {
    image_url: String,
    prompt: String,
    success: bool,
}

/// Generate a Pinterest caption for a topic.
async fn generate_caption(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CaptionRequest>,
) -> Result<Json<CaptionResponse>> {
    if payload.topic.trim().is_empty() {
        return Err(AppError::Validation("Topic must not be empty".to_string()));
    }

    let caption = state
        .ai
        .generate_caption(&payload.topic, &payload.tone, &payload.keywords)
        .await?;

    Ok(Json(CaptionResponse {
        caption,
        success: true,
    }))
}

/// Suggest hashtags for a topic.
async fn suggest_hashtags(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CaptionRequest>,
) -> Result<Json<HashtagsResponse>> {
    if payload.topic.trim().is_empty() {
        return Err(AppError::Validation("Topic must not be empty".to_string()));
    }

    let hashtags = state.ai.suggest_hashtags(&payload.topic).await?;

    Ok(Json(HashtagsResponse {
        hashtags,
        success: true,
    }))
}

/// Generate an image and return its URL.
async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImageGenerationRequest>,
) -> Result<Json<ImageResponse>> {
    if payload.prompt.trim().is_empty() {
        return Err(AppError::Validation("Prompt must not be empty".to_string()));
    }

    let image_url = state
        .ai
        .generate_image(
            &payload.prompt,
            &payload.style,
            &payload.size,
            &payload.quality,
        )
        .await?;

    Ok(Json(ImageResponse {
        image_url,
        prompt: payload.prompt,
        success: true,
    }))
}
