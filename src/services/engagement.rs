// src/services/engagement.rs
//
// Like and save toggles plus the view counter. Toggles are
// check-then-write inside a transaction; the insert racing another toggle
// hits the UNIQUE(user_id, post_id) constraint and is answered as if this
// call had won, so callers never see a raw constraint error.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AppError, is_foreign_key_violation, is_unique_violation};

#[derive(Clone)]
pub struct EngagementService {
    pool: SqlitePool,
}

impl EngagementService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Flips the like state for (user, post). Returns the state after the
    /// call: true when the post ended up liked.
    pub async fn toggle_like(&self, user_id: i64, post_id: i64) -> Result<bool, AppError> {
        self.toggle(user_id, post_id, "likes").await
    }

    /// Flips the saved state for (user, post), same semantics as likes.
    pub async fn toggle_save(&self, user_id: i64, post_id: i64) -> Result<bool, AppError> {
        self.toggle(user_id, post_id, "saved_posts").await
    }

    async fn toggle(&self, user_id: i64, post_id: i64, table: &str) -> Result<bool, AppError> {
        if user_id < 1 || post_id < 1 {
            return Err(AppError::BadRequest("Invalid post or user id".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(&format!(
            "SELECT 1 FROM {} WHERE user_id = ? AND post_id = ?",
            table
        ))
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            sqlx::query(&format!(
                "DELETE FROM {} WHERE user_id = ? AND post_id = ?",
                table
            ))
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(false);
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO {} (user_id, post_id, created_at) VALUES (?, ?, ?)",
            table
        ))
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(true)
            }
            // A concurrent toggle got there first. The row exists, so the
            // post is in the target state.
            Err(e) if is_unique_violation(&e) => Ok(true),
            Err(e) if is_foreign_key_violation(&e) => {
                Err(AppError::NotFound("Post or user not found".to_string()))
            }
            Err(e) => {
                tracing::error!("Failed to toggle {}: {:?}", table, e);
                Err(AppError::InternalServerError(e.to_string()))
            }
        }
    }

    /// Adds one view and returns the new counter. Every call counts; there
    /// is no per-user deduplication.
    pub async fn increment_views(&self, post_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar("UPDATE posts SET views = views + 1 WHERE id = ? RETURNING views")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))
    }

    /// Current view counter without incrementing.
    pub async fn views(&self, post_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT views FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))
    }
}
