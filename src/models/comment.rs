// src/models/comment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::AuthorSummary;

/// A comment hydrated with its author and one level of replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithReplies {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author: AuthorSummary,
    pub replies: Vec<ReplyDetail>,
}

/// A reply hydrated with its author. Replies never nest further.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDetail {
    pub id: i64,
    pub content: String,
    pub comment_id: i64,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author: AuthorSummary,
}

/// Title-only projection of the post a comment belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct PostRef {
    pub title: String,
}

/// Admin moderation view of a comment: author, parent post title and
/// replies, ordered by reply count in the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentModeration {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author: AuthorSummary,
    pub post: PostRef,
    pub replies: Vec<ReplyDetail>,
}

/// DTO for creating a comment on a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Comment content cannot be empty."))]
    pub content: String,
    pub user_id: i64,
}

/// DTO for creating a reply to a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, message = "Reply content cannot be empty."))]
    pub content: String,
    pub user_id: i64,
}
