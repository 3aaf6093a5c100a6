// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{UpdateUserRequest, User},
    services::{PostService, SocialGraphService, StatsService},
    utils::{jwt::Claims, uploads::remove_file},
};

const USER_COLUMNS: &str =
    "id, username, email, password, name, surname, age, bio, cover_image, role, created_at";

/// Public profile page payload: the user plus their posts, hydrated,
/// newest first.
pub async fn profile(
    State(pool): State<SqlitePool>,
    State(posts): State<PostService>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if user_id < 1 {
        return Err(AppError::BadRequest("Invalid user id".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let authored = posts.by_author(user_id).await?;

    Ok(Json(json!({ "user": user, "posts": authored })))
}

/// Follower and following counts for a user.
pub async fn user_stats(
    State(social): State<SocialGraphService>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if user_id < 1 {
        return Err(AppError::BadRequest("Invalid user id".to_string()));
    }

    let (follower_count, following_count) = social.stats(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "followerCount": follower_count,
        "followingCount": following_count,
    })))
}

/// Updates profile fields. Users may edit themselves; admins may edit
/// anyone. Absent fields are left as they are.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current_user_id = claims.sub.parse::<i64>().unwrap_or(0);
    if current_user_id != user_id && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You can only edit your own profile".to_string(),
        ));
    }

    payload.validate()?;

    if payload.is_empty() {
        let user = fetch_user(&pool, user_id).await?;
        return Ok(Json(json!({ "user": user })));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");

    if let Some(username) = payload.username {
        separated.push("username = ");
        separated.push_bind_unseparated(username);
    }

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(surname) = payload.surname {
        separated.push("surname = ");
        separated.push_bind_unseparated(surname);
    }

    if let Some(email) = payload.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email);
    }

    if let Some(bio) = payload.bio {
        separated.push("bio = ");
        separated.push_bind_unseparated(bio);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(user_id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email or username already exists".to_string())
        } else {
            tracing::error!("Failed to update user {}: {:?}", user_id, e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = fetch_user(&pool, user_id).await?;
    Ok(Json(json!({ "user": user })))
}

/// Deletes a user and everything they produced, then removes the cover
/// images of their posts from disk. Admin only; self-deletion is refused.
pub async fn delete_user(
    State(stats): State<StatsService>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.role != "admin" {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let current_user_id = claims.sub.parse::<i64>().unwrap_or(0);
    if user_id == current_user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let images = stats.delete_user(user_id).await?;

    for image in &images {
        remove_file(&config.upload_dir, image).await;
    }

    tracing::info!("User {} deleted", user_id);

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_user(pool: &SqlitePool, user_id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}
