// src/services/posts.rs
//
// Post storage and hydration. Every post-returning operation goes through
// the same pipeline: fetch base rows (post + author join), then batch-load
// tags, likes, saves and comments with IN lists and assemble PostDetail
// values in memory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::error::{AppError, is_foreign_key_violation};
use crate::models::engagement::{Like, SavedPost};
use crate::models::post::{CreatePostRequest, Post, PostDetail};
use crate::models::tag::Tag;
use crate::models::user::AuthorSummary;
use crate::ranking::{Ranked, rank};
use crate::services::comments::comments_for_posts;
use crate::utils::html::clean_html;

/// Base projection shared by every post query. 'type' is aliased because it
/// is a keyword on the Rust side.
const POST_WITH_AUTHOR: &str = "SELECT p.id, p.title, p.content, p.image, \
     p.type AS post_type, p.views, p.author_id, p.created_at, \
     u.username AS author_username, u.cover_image AS author_cover_image \
     FROM posts p JOIN users u ON u.id = p.author_id";

#[derive(FromRow)]
struct PostAuthorRow {
    id: i64,
    title: String,
    content: Option<String>,
    image: Option<String>,
    post_type: String,
    views: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_username: String,
    author_cover_image: Option<String>,
}

impl PostAuthorRow {
    fn into_parts(self) -> (Post, AuthorSummary) {
        let author = AuthorSummary {
            id: self.author_id,
            username: self.author_username,
            cover_image: self.author_cover_image,
        };
        let post = Post {
            id: self.id,
            title: self.title,
            content: self.content,
            image: self.image,
            post_type: self.post_type,
            views: self.views,
            author_id: self.author_id,
            created_at: self.created_at,
        };
        (post, author)
    }
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    label: String,
}

#[derive(Clone)]
pub struct PostService {
    pool: SqlitePool,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a post, attaches its tags and returns the hydrated result.
    /// Content is sanitized before storage.
    pub async fn create(&self, req: CreatePostRequest) -> Result<PostDetail, AppError> {
        let title = req
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::BadRequest(
                "Title and authorId are required".to_string(),
            ))?;
        let author_id = req
            .author_id
            .filter(|id| *id >= 1)
            .ok_or(AppError::BadRequest(
                "Title and authorId are required".to_string(),
            ))?;

        let content = req.content.as_deref().map(clean_html);

        let mut tag_ids = req.tags.clone();
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let mut tx = self.pool.begin().await?;

        let post_id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (title, content, image, type, views, author_id, created_at) \
             VALUES (?, ?, ?, 'DRAFT', 0, ?, ?) RETURNING id",
        )
        .bind(title)
        .bind(&content)
        .bind(&req.image)
        .bind(author_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Author not found".to_string())
            } else {
                tracing::error!("Failed to create post: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

        for tag_id in &tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_foreign_key_violation(&e) {
                        AppError::BadRequest(format!("Unknown tag id {}", tag_id))
                    } else {
                        AppError::InternalServerError(e.to_string())
                    }
                })?;
        }

        tx.commit().await?;

        self.get_detail(post_id).await
    }

    /// Loads one hydrated post.
    pub async fn get_detail(&self, post_id: i64) -> Result<PostDetail, AppError> {
        let sql = format!("{} WHERE p.id = ?", POST_WITH_AUTHOR);
        let row = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

        let mut details = self.hydrate(vec![row]).await?;
        details
            .pop()
            .ok_or(AppError::NotFound("Post not found".to_string()))
    }

    /// All posts hydrated and ranked by popularity, highest score first.
    /// Base rows come back newest first, which is the tiebreak order the
    /// stable sort preserves.
    pub async fn list_ranked(&self) -> Result<Vec<Ranked<PostDetail>>, AppError> {
        let sql = format!("{} ORDER BY p.created_at DESC, p.id DESC", POST_WITH_AUTHOR);
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let details = self.hydrate(rows).await?;
        Ok(rank(details))
    }

    /// One page of posts written by any of the given authors, newest first.
    pub async fn by_author_ids(
        &self,
        author_ids: &[i64],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostDetail>, AppError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new(format!("{} WHERE p.author_id IN (", POST_WITH_AUTHOR));
        let mut separated = query_builder.separated(",");
        for id in author_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query_builder.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        query_builder.push_bind(limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let rows: Vec<PostAuthorRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Posts written by a single author, newest first.
    pub async fn by_author(&self, author_id: i64) -> Result<Vec<PostDetail>, AppError> {
        let sql = format!(
            "{} WHERE p.author_id = ? ORDER BY p.created_at DESC, p.id DESC",
            POST_WITH_AUTHOR
        );
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Posts carrying the given tag, newest first. An unknown tag yields an
    /// empty list.
    pub async fn by_tag(&self, tag_id: i64) -> Result<Vec<PostDetail>, AppError> {
        let sql = format!(
            "{} WHERE p.id IN (SELECT post_id FROM post_tags WHERE tag_id = ?) \
             ORDER BY p.created_at DESC, p.id DESC",
            POST_WITH_AUTHOR
        );
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(tag_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Posts the user saved, in the order they saved them.
    pub async fn saved_by(&self, user_id: i64) -> Result<Vec<PostDetail>, AppError> {
        let sql = format!(
            "{} JOIN saved_posts sp ON sp.post_id = p.id WHERE sp.user_id = ? \
             ORDER BY sp.id ASC",
            POST_WITH_AUTHOR
        );
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Case-insensitive search over title and author username, newest first.
    pub async fn search(&self, term: &str) -> Result<Vec<PostDetail>, AppError> {
        let sql = format!(
            "{} WHERE p.title LIKE '%' || ? || '%' OR u.username LIKE '%' || ? || '%' \
             ORDER BY p.created_at DESC, p.id DESC",
            POST_WITH_AUTHOR
        );
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(term)
            .bind(term)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Deletes a post and everything hanging off it in one transaction:
    /// replies under its comments, the comments, likes, saves and tag links,
    /// then the post row. Returns the deleted post so the caller can report
    /// it and clean up its image file.
    pub async fn delete_cascade(&self, post_id: i64) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, image, type AS post_type, views, author_id, created_at \
             FROM posts WHERE id = ?",
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

        sqlx::query(
            "DELETE FROM replies WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?)",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM likes WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM saved_posts WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post {}: {:?}", post_id, e);
                AppError::InternalServerError(e.to_string())
            })?;

        tx.commit().await?;

        Ok(post)
    }

    /// Attaches tags, likes, saves and comments to the base rows, keeping
    /// the incoming row order.
    async fn hydrate(&self, rows: Vec<PostAuthorRow>) -> Result<Vec<PostDetail>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let mut tags = self.tags_for(&post_ids).await?;
        let mut likes = self.likes_for(&post_ids).await?;
        let mut saved = self.saved_for(&post_ids).await?;
        let mut comments = comments_for_posts(&self.pool, &post_ids).await?;

        let details = rows
            .into_iter()
            .map(|row| {
                let (post, author) = row.into_parts();
                let id = post.id;
                PostDetail {
                    post,
                    author,
                    tags: tags.remove(&id).unwrap_or_default(),
                    likes: likes.remove(&id).unwrap_or_default(),
                    saved: saved.remove(&id).unwrap_or_default(),
                    comments: comments.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(details)
    }

    async fn tags_for(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT pt.post_id, t.id, t.label FROM post_tags pt \
             JOIN tags t ON t.id = pt.tag_id WHERE pt.post_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in post_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query_builder.push(" ORDER BY t.id ASC");

        let rows: Vec<PostTagRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(Tag {
                id: row.id,
                label: row.label,
            });
        }
        Ok(grouped)
    }

    async fn likes_for(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Like>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, post_id, created_at FROM likes WHERE post_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in post_ids {
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
            grouped.entry(row.post_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn saved_for(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<SavedPost>>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, post_id, created_at FROM saved_posts WHERE post_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in post_ids {
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
            grouped.entry(row.post_id).or_default().push(row);
        }
        Ok(grouped)
    }
}
