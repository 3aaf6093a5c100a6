// src/models/follower.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'followers' table. One row per (follower, following) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Follower {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Body of the follow / unfollow / isfollowing requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: i64,
    pub following_id: i64,
}
