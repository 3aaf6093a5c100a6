// src/handlers/tags.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{error::AppError, models::tag::Tag, services::PostService};

/// Lists every tag.
pub async fn list_tags(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, label FROM tags ORDER BY id ASC")
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({ "tags": tags })))
}

/// Posts carrying the given tag, hydrated, newest first.
pub async fn posts_by_tag(
    State(posts): State<PostService>,
    Path(tag_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if tag_id < 1 {
        return Err(AppError::BadRequest("Invalid tag id".to_string()));
    }

    let tagged = posts.by_tag(tag_id).await?;
    Ok(Json(json!({ "posts": tagged })))
}
