// src/handlers/engagement.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::engagement::{ToggleRequest, UserIdRequest},
    services::{EngagementService, PostService},
};

/// Toggles the caller's like on a post. Responds with the state after the
/// call.
pub async fn toggle_like(
    State(engagement): State<EngagementService>,
    Path(post_id): Path<i64>,
    Json(payload): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let liked = engagement.toggle_like(payload.user_id, post_id).await?;
    Ok(Json(json!({ "liked": liked })))
}

/// Toggles the caller's save on a post.
pub async fn toggle_save(
    State(engagement): State<EngagementService>,
    Path(post_id): Path<i64>,
    Json(payload): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let saved = engagement.toggle_save(payload.user_id, post_id).await?;
    Ok(Json(json!({ "success": true, "saved": saved })))
}

/// Posts the user saved, hydrated, in save order.
pub async fn saved_posts(
    State(posts): State<PostService>,
    Json(payload): Json<UserIdRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.user_id < 1 {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }

    let saved = posts.saved_by(payload.user_id).await?;
    Ok(Json(json!({ "success": true, "posts": saved })))
}

/// Counts one view and answers the new total.
pub async fn increment_views(
    State(engagement): State<EngagementService>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let views = engagement.increment_views(post_id).await?;
    Ok(Json(json!({ "success": true, "views": views })))
}

/// Current view counter.
pub async fn get_views(
    State(engagement): State<EngagementService>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let views = engagement.views(post_id).await?;
    Ok(Json(json!({ "success": true, "views": views })))
}
