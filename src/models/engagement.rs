// src/models/engagement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'likes' table. One row per (user, post) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'saved_posts' table. One row per (user, post) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPost {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Body of the like / save toggle requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub user_id: i64,
}

/// Body of requests that only carry the acting user's id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: i64,
}
