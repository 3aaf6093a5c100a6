// src/services/social_graph.rs
//
// Follow relationships and the followed feed.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AppError, is_foreign_key_violation, is_unique_violation};
use crate::models::follower::Follower;
use crate::models::post::PostDetail;
use crate::services::posts::PostService;

/// Feed page size.
const FEED_PAGE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct SocialGraphService {
    pool: SqlitePool,
    posts: PostService,
}

impl SocialGraphService {
    pub fn new(pool: SqlitePool, posts: PostService) -> Self {
        Self { pool, posts }
    }

    /// Creates a follow edge. Self-follows and non-positive ids are
    /// rejected; an existing edge is a conflict, an unknown user 404s.
    pub async fn follow(&self, follower_id: i64, following_id: i64) -> Result<Follower, AppError> {
        if follower_id < 1 || following_id < 1 {
            return Err(AppError::BadRequest("Invalid user id".to_string()));
        }
        if follower_id == following_id {
            return Err(AppError::BadRequest(
                "You cannot follow yourself".to_string(),
            ));
        }

        sqlx::query_as::<_, Follower>(
            "INSERT INTO followers (follower_id, following_id, created_at) VALUES (?, ?, ?) \
             RETURNING id, follower_id, following_id, created_at",
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Already following this user".to_string())
            } else if is_foreign_key_violation(&e) {
                AppError::NotFound("User not found".to_string())
            } else {
                tracing::error!("Failed to follow: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })
    }

    /// Removes the follow edge. Succeeds whether or not it existed.
    pub async fn unfollow(&self, follower_id: i64, following_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM followers WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_following(&self, follower_id: i64, following_id: i64) -> Result<bool, AppError> {
        let existing =
            sqlx::query("SELECT 1 FROM followers WHERE follower_id = ? AND following_id = ?")
                .bind(follower_id)
                .bind(following_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(existing.is_some())
    }

    /// One page of the user's feed: posts by followed authors plus their
    /// own, newest first, ten per page. Page numbers below one are clamped.
    pub async fn followed_feed(
        &self,
        user_id: i64,
        page: Option<i64>,
    ) -> Result<Vec<PostDetail>, AppError> {
        if user_id < 1 {
            return Err(AppError::BadRequest("Invalid user id".to_string()));
        }

        let page = page.unwrap_or(1).max(1);
        let offset = (page - 1) * FEED_PAGE_SIZE;

        let mut author_ids: Vec<i64> =
            sqlx::query_scalar("SELECT following_id FROM followers WHERE follower_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        author_ids.push(user_id);

        self.posts
            .by_author_ids(&author_ids, FEED_PAGE_SIZE, offset)
            .await
    }

    /// Follower and following counts for a user.
    pub async fn stats(&self, user_id: i64) -> Result<(i64, i64), AppError> {
        let follower_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM followers WHERE following_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let following_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM followers WHERE follower_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((follower_count, following_count))
    }
}
