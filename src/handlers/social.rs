// src/handlers/social.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::{follower::FollowRequest, post::FeedRequest},
    services::SocialGraphService,
};

/// Creates a follow edge.
pub async fn follow(
    State(social): State<SocialGraphService>,
    Json(payload): Json<FollowRequest>,
) -> Result<impl IntoResponse, AppError> {
    let edge = social
        .follow(payload.follower_id, payload.following_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "follow": edge })),
    ))
}

/// Removes a follow edge. Succeeds even when none existed.
pub async fn unfollow(
    State(social): State<SocialGraphService>,
    Json(payload): Json<FollowRequest>,
) -> Result<impl IntoResponse, AppError> {
    social
        .unfollow(payload.follower_id, payload.following_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Whether follower currently follows following.
pub async fn is_following(
    State(social): State<SocialGraphService>,
    Json(payload): Json<FollowRequest>,
) -> Result<impl IntoResponse, AppError> {
    let following = social
        .is_following(payload.follower_id, payload.following_id)
        .await?;
    Ok(Json(json!({ "isFollowing": following })))
}

/// One page of the caller's feed: posts from followed authors plus their
/// own.
pub async fn followed_feed(
    State(social): State<SocialGraphService>,
    Json(payload): Json<FeedRequest>,
) -> Result<impl IntoResponse, AppError> {
    let posts = social.followed_feed(payload.user_id, payload.page).await?;
    Ok(Json(json!({ "posts": posts })))
}
