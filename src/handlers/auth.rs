// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{build_auth_cookie, expire_auth_cookie, sign_jwt},
        uploads::store_file,
    },
};

const USER_COLUMNS: &str =
    "id, username, email, password, name, surname, age, bio, cover_image, role, created_at";

/// Registers a new user from the multipart signup form.
///
/// The avatar arrives either as a file part (stored under the upload
/// directory) or as the filename of a previous upload. On success the
/// session cookie is installed right away.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut payload = RegisterRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match name.as_str() {
            "username" => payload.username = read_text(field).await?,
            "name" => payload.name = read_text(field).await?,
            "surname" => payload.surname = read_text(field).await?,
            "email" => payload.email = read_text(field).await?,
            "password" => payload.password = read_text(field).await?,
            "age" => payload.age = read_text(field).await?.trim().parse().ok(),
            "coverImage" => {
                let file_name = field.file_name().map(|f| f.to_string());
                match file_name {
                    Some(original) if !original.is_empty() => {
                        let data = field.bytes().await.map_err(|e| {
                            AppError::BadRequest(format!("Invalid multipart payload: {}", e))
                        })?;
                        if !data.is_empty() {
                            payload.cover_image =
                                Some(store_file(&config.upload_dir, &original, &data).await?);
                        }
                    }
                    _ => {
                        let text = read_text(field).await?;
                        if !text.is_empty() {
                            payload.cover_image = Some(text);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password, name, surname, age, cover_image, role, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'user', ?) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(payload.age)
    .bind(&payload.cover_image)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if crate::error::is_unique_violation(&e) {
            AppError::Conflict("Email or username already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = sign_jwt(
        user.id,
        &user.username,
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;
    let cookie = build_auth_cookie(&token, config.jwt_expiration);

    tracing::info!("New user registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "message": "Registration completed successfully.",
            "user": user
        })),
    ))
}

/// Authenticates by email or username and installs the session cookie.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ? OR username = ?",
        USER_COLUMNS
    ))
    .bind(&payload.email)
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::AuthError("User not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(
        user.id,
        &user.username,
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;
    let cookie = build_auth_cookie(&token, config.jwt_expiration);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "message": "Login successful.",
            "user": user
        })),
    ))
}

/// Clears the session cookie. Always succeeds, logged in or not.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, expire_auth_cookie())],
        Json(json!({ "success": true, "message": "Logged out." })),
    )
}

/// Returns the authenticated user's account.
pub async fn me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<crate::utils::jwt::Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "success": true, "user": user })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))
}
