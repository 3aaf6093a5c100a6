// src/models/post.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::comment::CommentWithReplies;
use super::engagement::{Like, SavedPost};
use super::tag::Tag;
use super::user::AuthorSummary;

/// Represents the 'posts' table in the database.
/// Queries alias the 'type' column to 'post_type' for FromRow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,

    /// Sanitized HTML body.
    pub content: Option<String>,

    /// Filename of the cover image, served under /blog.
    pub image: Option<String>,

    #[serde(rename = "type")]
    pub post_type: String,

    pub views: i64,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A post hydrated with its author, tags and engagement rows. This is the
/// shape every post-returning endpoint responds with.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
    pub tags: Vec<Tag>,
    pub likes: Vec<Like>,
    pub saved: Vec<SavedPost>,
    pub comments: Vec<CommentWithReplies>,
}

/// DTO for post creation. Title and author are checked in the service so
/// a missing field answers 400 rather than a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,

    /// Raw HTML from the editor. Sanitized before storage.
    pub content: Option<String>,

    pub author_id: Option<i64>,

    /// Filename of a previously uploaded cover image.
    pub image: Option<String>,

    /// Ids of existing tags to attach.
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Query parameters for title search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
}

/// Body of the followed-feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub user_id: i64,
    pub page: Option<i64>,
}
