// src/utils/uploads.rs

use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::error::AppError;

/// Writes uploaded bytes into the upload directory under a fresh UUID
/// filename, keeping the original extension (".jpg" when absent). Returns
/// the stored filename, which is what gets persisted on the row and served
/// back under /blog.
pub async fn store_file(
    upload_dir: &str,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to create upload dir: {}", e)))?;

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".jpg".to_string());

    let filename = format!("{}{}", Uuid::new_v4(), ext);
    let path = Path::new(upload_dir).join(&filename);

    fs::write(&path, data)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to store upload: {}", e)))?;

    Ok(filename)
}

/// Removes a stored file. A missing file is treated as already removed.
pub async fn remove_file(upload_dir: &str, filename: &str) {
    let path = Path::new(upload_dir).join(filename);

    if let Err(e) = fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove upload '{}': {}", filename, e);
        }
    }
}
