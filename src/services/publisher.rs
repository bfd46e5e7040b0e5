// SPDX-License-Identifier: MIT

//! Publishing drafts to Pinterest boards.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Post, PostStatus, User};
use crate::services::pinterest::{PinterestService, PIN_TITLE_MAX_CHARS};
use crate::time_utils::now_rfc3339;

/// Truncate a caption to the provider's pin-title limit, on a char boundary.
fn pin_title(caption: &str) -> String {
    caption.chars().take(PIN_TITLE_MAX_CHARS).collect()
}

/// Maps a draft post to pin-creation calls and records the outcome.
#[derive(Clone)]
pub struct PostPublisher {
    db: FirestoreDb,
    pinterest: PinterestService,
}

impl PostPublisher {
    pub fn new(db: FirestoreDb, pinterest: PinterestService) -> Self {
        Self { db, pinterest }
    }

    /// Publish a post to the given boards, one pin per board, in order.
    ///
    /// Pins are created sequentially with no rollback: if pin N fails, pins
    /// 1..N-1 remain on Pinterest, the post stays unpublished, and the earlier
    /// pin IDs are discarded. Re-driving the publish is safe.
    pub async fn publish(
        &self,
        user: &User,
        post_id: &str,
        board_ids: &[String],
    ) -> Result<Post, AppError> {
        let mut post = self
            .db
            .get_post(post_id)
            .await?
            .filter(|p| p.user_id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))?;

        if board_ids.is_empty() {
            return Err(AppError::Validation(
                "At least one board must be selected".to_string(),
            ));
        }
        let image_url = post
            .image_url
            .clone()
            .ok_or_else(|| AppError::Validation("Post has no image to publish".to_string()))?;
        if post.status == PostStatus::Published {
            return Err(AppError::Validation(
                "Post is already published".to_string(),
            ));
        }
        if !user.pinterest_connected {
            return Err(AppError::NotConnected);
        }

        let title = pin_title(&post.caption);
        let mut guarded_user = user.clone();
        let mut pin_ids = Vec::with_capacity(board_ids.len());

        for board_id in board_ids {
            let pin = self
                .pinterest
                .create_pin(
                    &mut guarded_user,
                    board_id,
                    &title,
                    &post.caption,
                    &image_url,
                    None,
                )
                .await?;
            pin_ids.push(pin.id);
        }

        post.status = PostStatus::Published;
        post.published_at = Some(now_rfc3339());
        post.pinterest_pin_ids = pin_ids;
        post.published_boards = board_ids.to_vec();
        post.updated_at = now_rfc3339();
        self.db.upsert_post(&post).await?;

        tracing::info!(
            user_id = %user.id,
            post_id = %post.id,
            boards = board_ids.len(),
            "Post published to Pinterest"
        );

        Ok(post)
    }
}
