// src/handlers/comments.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::{CreateCommentRequest, CreateReplyRequest},
    services::CommentService,
};

/// Comments on a post, newest first, each with its replies oldest first.
pub async fn list_comments(
    State(comments): State<CommentService>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let found = comments.list_comments(post_id).await?;
    Ok(Json(json!({ "success": true, "comments": found })))
}

/// Adds a comment to a post.
pub async fn create_comment(
    State(comments): State<CommentService>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let comment = comments
        .add_comment(post_id, payload.user_id, &payload.content)
        .await?;
    Ok(Json(json!({ "success": true, "comment": comment })))
}

/// Replies under a comment, oldest first.
pub async fn list_replies(
    State(comments): State<CommentService>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let found = comments.list_replies(comment_id).await?;
    Ok(Json(json!({ "success": true, "replies": found })))
}

/// Adds a reply under a comment.
pub async fn create_reply(
    State(comments): State<CommentService>,
    Path(comment_id): Path<i64>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = comments
        .add_reply(comment_id, payload.user_id, &payload.content)
        .await?;
    Ok(Json(json!({ "success": true, "reply": reply })))
}
