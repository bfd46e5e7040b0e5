// SPDX-License-Identifier: MIT

//! Post model for storage and API.

use serde::{Deserialize, Serialize};

/// Post lifecycle. Transitions only move forward: a draft or scheduled post
/// may be published; a published post never returns to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

/// Draft/scheduled/published post stored in Firestore, owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// UUID string, also used as document ID
    pub id: String,
    /// Owning user's ID
    pub user_id: String,
    pub caption: String,
    /// Image to publish; publishing requires this to be set
    pub image_url: Option<String>,
    /// Target board IDs selected while drafting
    pub boards: Vec<String>,
    pub scheduled_time: Option<String>,
    pub status: PostStatus,
    pub ai_generated_caption: bool,
    pub ai_generated_image: bool,
    /// Pin IDs created on publish, in board order
    pub pinterest_pin_ids: Vec<String>,
    /// Board IDs actually targeted on publish
    pub published_boards: Vec<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
