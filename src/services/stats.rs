// src/services/stats.rs
//
// Admin aggregates: platform counters, the ranked user and comment
// listings and full user removal.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::comment::{CommentModeration, CommentWithReplies, PostRef};
use crate::models::engagement::{Like, SavedPost};
use crate::models::user::{AuthorSummary, User, UserDetail};
use crate::ranking::{Ranked, rank};
use crate::services::comments::{CommentRow, replies_for_comments};

/// Platform-wide counters. 'comments' folds comment and reply rows
/// together.
#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub posts: i64,
    pub users: i64,
    pub comments: i64,
}

#[derive(FromRow)]
struct CommentPostRow {
    id: i64,
    content: String,
    post_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_username: String,
    author_cover_image: Option<String>,
    post_title: String,
}

#[derive(Clone)]
pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Counts posts, users and comments (replies included), fresh per call.
    pub async fn platform_stats(&self) -> Result<PlatformStats, AppError> {
        let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;
        let replies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replies")
            .fetch_one(&self.pool)
            .await?;

        Ok(PlatformStats {
            posts,
            users,
            comments: comments + replies,
        })
    }

    /// Every user hydrated with the engagement they produced (likes, saves,
    /// comments with the replies those comments received), ranked by the
    /// shared popularity formula. Base order is registration order, which
    /// ties preserve.
    pub async fn ranked_users(&self) -> Result<Vec<Ranked<UserDetail>>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, name, surname, age, bio, cover_image, \
             role, created_at FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        if users.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut likes = self.likes_by_users(&user_ids).await?;
        let mut saved = self.saved_by_users(&user_ids).await?;
        let mut comments = self.comments_by_authors(&user_ids).await?;

        let details = users
            .into_iter()
            .map(|user| {
                let id = user.id;
                UserDetail {
                    user,
                    likes: likes.remove(&id).unwrap_or_default(),
                    saved: saved.remove(&id).unwrap_or_default(),
                    comments: comments.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(rank(details))
    }

    /// Every comment with its author, parent post title and replies,
    /// ranked by reply count.
    pub async fn ranked_comments(&self) -> Result<Vec<Ranked<CommentModeration>>, AppError> {
        let rows = sqlx::query_as::<_, CommentPostRow>(
            "SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, \
             u.username AS author_username, u.cover_image AS author_cover_image, \
             p.title AS post_title \
             FROM comments c \
             JOIN users u ON u.id = c.author_id \
             JOIN posts p ON p.id = c.post_id \
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let comment_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut replies = replies_for_comments(&self.pool, &comment_ids).await?;

        let moderations: Vec<CommentModeration> = rows
            .into_iter()
            .map(|row| CommentModeration {
                id: row.id,
                content: row.content,
                post_id: row.post_id,
                author_id: row.author_id,
                created_at: row.created_at,
                author: AuthorSummary {
                    id: row.author_id,
                    username: row.author_username,
                    cover_image: row.author_cover_image,
                },
                post: PostRef {
                    title: row.post_title,
                },
                replies: replies.remove(&row.id).unwrap_or_default(),
            })
            .collect();

        Ok(rank(moderations))
    }

    /// Removes a user and everything they touched in one transaction:
    /// replies and comments on their posts, their own replies and comments
    /// elsewhere, likes and saves in both directions, their posts with tag
    /// links, and follow edges either way. Returns the image filenames of
    /// the removed posts so the caller can delete the files afterwards.
    pub async fn delete_user(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let images: Vec<String> = sqlx::query_scalar(
            "SELECT image FROM posts WHERE author_id = ? AND image IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        // Children before parents: replies, comments, engagement rows, tag
        // links, posts, follow edges, then the user row itself.
        sqlx::query(
            "DELETE FROM replies WHERE comment_id IN \
             (SELECT id FROM comments WHERE post_id IN \
              (SELECT id FROM posts WHERE author_id = ?))",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM replies WHERE comment_id IN \
             (SELECT id FROM comments WHERE author_id = ?)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM replies WHERE author_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM comments WHERE post_id IN (SELECT id FROM posts WHERE author_id = ?)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE author_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM likes WHERE user_id = ? \
             OR post_id IN (SELECT id FROM posts WHERE author_id = ?)",
        )
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM saved_posts WHERE user_id = ? \
             OR post_id IN (SELECT id FROM posts WHERE author_id = ?)",
        )
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM post_tags WHERE post_id IN (SELECT id FROM posts WHERE author_id = ?)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM posts WHERE author_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM followers WHERE follower_id = ? OR following_id = ?")
            .bind(user_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user {}: {:?}", user_id, e);
                AppError::InternalServerError(e.to_string())
            })?;

        tx.commit().await?;

        Ok(images)
    }

    async fn likes_by_users(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Like>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, post_id, created_at FROM likes WHERE user_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query_builder.push(" ORDER BY id ASC");

        let rows: Vec<Like> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<Like>> = HashMap::new();
        for row in rows {
            grouped.entry(row.user_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn saved_by_users(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<SavedPost>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, post_id, created_at FROM saved_posts WHERE user_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query_builder.push(" ORDER BY id ASC");

        let rows: Vec<SavedPost> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<SavedPost>> = HashMap::new();
        for row in rows {
            grouped.entry(row.user_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn comments_by_authors(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<CommentWithReplies>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, \
             u.username AS author_username, u.cover_image AS author_cover_image \
             FROM comments c JOIN users u ON u.id = c.author_id WHERE c.author_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query_builder.push(" ORDER BY c.created_at DESC, c.id DESC");

        let comment_rows: Vec<CommentRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let comment_ids: Vec<i64> = comment_rows.iter().map(|c| c.id).collect();
        let mut replies = replies_for_comments(&self.pool, &comment_ids).await?;

        let mut grouped: HashMap<i64, Vec<CommentWithReplies>> = HashMap::new();
        for row in comment_rows {
            let author_id = row.author_id;
            let comment_replies = replies.remove(&row.id).unwrap_or_default();
            grouped
                .entry(author_id)
                .or_default()
                .push(row.into_comment(comment_replies));
        }
        Ok(grouped)
    }
}
