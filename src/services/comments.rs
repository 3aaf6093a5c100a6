// src/services/comments.rs
//
// Comments and their single level of replies. Listing keeps comments
// newest first and replies oldest first, so a thread reads top-down.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::error::{AppError, is_foreign_key_violation};
use crate::models::comment::{CommentWithReplies, ReplyDetail};
use crate::models::user::AuthorSummary;

#[derive(FromRow)]
pub(crate) struct CommentRow {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub author_username: String,
    pub author_cover_image: Option<String>,
}

impl CommentRow {
    pub fn into_comment(self, replies: Vec<ReplyDetail>) -> CommentWithReplies {
        CommentWithReplies {
            id: self.id,
            content: self.content,
            post_id: self.post_id,
            author_id: self.author_id,
            created_at: self.created_at,
            author: AuthorSummary {
                id: self.author_id,
                username: self.author_username,
                cover_image: self.author_cover_image,
            },
            replies,
        }
    }
}

#[derive(FromRow)]
struct ReplyRow {
    id: i64,
    content: String,
    comment_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_username: String,
    author_cover_image: Option<String>,
}

impl ReplyRow {
    fn into_reply(self) -> ReplyDetail {
        ReplyDetail {
            id: self.id,
            content: self.content,
            comment_id: self.comment_id,
            author_id: self.author_id,
            created_at: self.created_at,
            author: AuthorSummary {
                id: self.author_id,
                username: self.author_username,
                cover_image: self.author_cover_image,
            },
        }
    }
}

/// Batch-loads hydrated comments for a set of posts, newest first per post,
/// replies oldest first. Shared by the post hydration pipeline.
pub(crate) async fn comments_for_posts(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<CommentWithReplies>>, AppError> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, \
         u.username AS author_username, u.cover_image AS author_cover_image \
         FROM comments c JOIN users u ON u.id = c.author_id WHERE c.post_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in post_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    query_builder.push(" ORDER BY c.created_at DESC, c.id DESC");

    let comment_rows: Vec<CommentRow> = query_builder.build_query_as().fetch_all(pool).await?;

    let comment_ids: Vec<i64> = comment_rows.iter().map(|c| c.id).collect();
    let mut replies = replies_for_comments(pool, &comment_ids).await?;

    let mut grouped: HashMap<i64, Vec<CommentWithReplies>> = HashMap::new();
    for row in comment_rows {
        let post_id = row.post_id;
        let comment_replies = replies.remove(&row.id).unwrap_or_default();
        grouped
            .entry(post_id)
            .or_default()
            .push(row.into_comment(comment_replies));
    }
    Ok(grouped)
}

/// Batch-loads hydrated replies keyed by comment id, oldest first.
pub(crate) async fn replies_for_comments(
    pool: &SqlitePool,
    comment_ids: &[i64],
) -> Result<HashMap<i64, Vec<ReplyDetail>>, AppError> {
    if comment_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT r.id, r.content, r.comment_id, r.author_id, r.created_at, \
         u.username AS author_username, u.cover_image AS author_cover_image \
         FROM replies r JOIN users u ON u.id = r.author_id WHERE r.comment_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in comment_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    query_builder.push(" ORDER BY r.created_at ASC, r.id ASC");

    let reply_rows: Vec<ReplyRow> = query_builder.build_query_as().fetch_all(pool).await?;

    let mut grouped: HashMap<i64, Vec<ReplyDetail>> = HashMap::new();
    for row in reply_rows {
        grouped
            .entry(row.comment_id)
            .or_default()
            .push(row.into_reply());
    }
    Ok(grouped)
}

#[derive(Clone)]
pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Adds a comment to a post and returns it hydrated (author attached,
    /// no replies yet).
    pub async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithReplies, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest(
                "Comment content cannot be empty".to_string(),
            ));
        }
        if post_id < 1 || user_id < 1 {
            return Err(AppError::BadRequest("Invalid post or user id".to_string()));
        }

        let comment_id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (content, post_id, author_id, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(content)
        .bind(post_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Post or user not found".to_string())
            } else {
                tracing::error!("Failed to add comment: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, \
             u.username AS author_username, u.cover_image AS author_cover_image \
             FROM comments c JOIN users u ON u.id = c.author_id WHERE c.id = ?",
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment(Vec::new()))
    }

    /// Comments on a post, newest first, replies oldest first. An unknown
    /// post yields an empty list.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentWithReplies>, AppError> {
        let mut grouped = comments_for_posts(&self.pool, &[post_id]).await?;
        Ok(grouped.remove(&post_id).unwrap_or_default())
    }

    /// Adds a reply under a comment and returns it hydrated.
    pub async fn add_reply(
        &self,
        comment_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<ReplyDetail, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest(
                "Reply content cannot be empty".to_string(),
            ));
        }
        if comment_id < 1 || user_id < 1 {
            return Err(AppError::BadRequest(
                "Invalid comment or user id".to_string(),
            ));
        }

        let reply_id: i64 = sqlx::query_scalar(
            "INSERT INTO replies (content, comment_id, author_id, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(content)
        .bind(comment_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Comment or user not found".to_string())
            } else {
                tracing::error!("Failed to add reply: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

        let row = sqlx::query_as::<_, ReplyRow>(
            "SELECT r.id, r.content, r.comment_id, r.author_id, r.created_at, \
             u.username AS author_username, u.cover_image AS author_cover_image \
             FROM replies r JOIN users u ON u.id = r.author_id WHERE r.id = ?",
        )
        .bind(reply_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_reply())
    }

    /// Replies under a comment, oldest first.
    pub async fn list_replies(&self, comment_id: i64) -> Result<Vec<ReplyDetail>, AppError> {
        let mut grouped = replies_for_comments(&self.pool, &[comment_id]).await?;
        Ok(grouped.remove(&comment_id).unwrap_or_default())
    }

    /// Removes a comment and its replies in one transaction.
    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT 1 FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        sqlx::query("DELETE FROM replies WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
