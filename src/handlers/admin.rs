// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::tag::{CreateTagRequest, Tag},
    services::{CommentService, StatsService},
};

/// Platform-wide counters for the dashboard. 'comments' folds comments
/// and replies together.
pub async fn platform_stats(
    State(stats): State<StatsService>,
) -> Result<impl IntoResponse, AppError> {
    let counts = stats.platform_stats().await?;
    Ok(Json(counts))
}

/// Every user with the engagement behind their score, most active first.
/// Admin only.
pub async fn list_users(State(stats): State<StatsService>) -> Result<impl IntoResponse, AppError> {
    let users = stats.ranked_users().await?;
    Ok(Json(json!({ "users": users })))
}

/// Every comment with author, post title and replies, most replied-to
/// first. Admin only.
pub async fn list_comments(
    State(stats): State<StatsService>,
) -> Result<impl IntoResponse, AppError> {
    let comments = stats.ranked_comments().await?;
    Ok(Json(json!({ "comments": comments })))
}

/// Removes a comment and its replies. Admin only.
pub async fn delete_comment(
    State(comments): State<CommentService>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    comments.delete_comment(comment_id).await?;

    tracing::info!("Comment {} deleted", comment_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a tag. Admin only; duplicate labels conflict.
pub async fn create_tag(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let label = payload.label.trim().to_string();

    let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (label) VALUES (?) RETURNING id, label")
        .bind(&label)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Tag '{}' already exists", label))
            } else {
                tracing::error!("Failed to create tag: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "tag": tag })),
    ))
}
