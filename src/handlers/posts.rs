// src/handlers/posts.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::post::{CreatePostRequest, SearchParams},
    services::PostService,
    utils::uploads::{remove_file, store_file},
};

/// All posts, ranked by popularity. Each entry carries its totalScore.
pub async fn list_posts(State(posts): State<PostService>) -> Result<impl IntoResponse, AppError> {
    let ranked = posts.list_ranked().await?;
    Ok(Json(json!({ "posts": ranked })))
}

/// Creates a post and returns it hydrated.
pub async fn create_post(
    State(posts): State<PostService>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "post": post })),
    ))
}

/// One post, hydrated.
pub async fn get_post(
    State(posts): State<PostService>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts.get_detail(post_id).await?;
    Ok(Json(json!({ "post": post })))
}

/// Deletes a post with everything attached to it, then removes its cover
/// image from disk. The file removal is best-effort; the row deletion has
/// already committed.
pub async fn delete_post(
    State(posts): State<PostService>,
    State(config): State<Config>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts.delete_cascade(post_id).await?;

    if let Some(image) = &post.image {
        remove_file(&config.upload_dir, image).await;
    }

    tracing::info!("Post {} deleted", post_id);

    Ok(Json(json!({ "message": "Post deleted", "post": post })))
}

/// Title / author search. A missing or blank term yields every post.
pub async fn search_posts(
    State(posts): State<PostService>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let term = params.title.unwrap_or_default();
    let found = posts.search(term.trim()).await?;
    Ok(Json(json!({ "posts": found })))
}

/// Stores one multipart file part and answers with the generated filename.
pub async fn upload_file(
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or("upload.jpg").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        if data.is_empty() {
            break;
        }

        let filename = store_file(&config.upload_dir, &original, &data).await?;

        return Ok(Json(json!({
            "success": true,
            "message": "File uploaded",
            "data": { "filename": filename }
        })));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}
