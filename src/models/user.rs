// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::comment::CommentWithReplies;
use super::engagement::{Like, SavedPost};

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub name: String,
    pub surname: String,
    pub age: i64,
    pub bio: Option<String>,

    /// Filename of the uploaded avatar, served under /blog.
    pub cover_image: Option<String>,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public author projection embedded in posts, comments and replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
    pub cover_image: Option<String>,
}

/// A user together with the engagement rows backing their popularity score:
/// likes and saves they made, comments they wrote (with replies received).
#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub likes: Vec<Like>,
    pub saved: Vec<SavedPost>,
    pub comments: Vec<CommentWithReplies>,
}

/// DTO for registration. Assembled from the multipart form before
/// validation, so every field has a lenient default.
#[derive(Debug, Default, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters."
    ))]
    pub username: String,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Name must be between 3 and 30 characters."
    ))]
    pub name: String,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Surname must be between 3 and 30 characters."
    ))]
    pub surname: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(
        required(message = "Age is required."),
        range(min = 15, max = 110, message = "Age must be between 15 and 110.")
    )]
    pub age: Option<i64>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,

    /// Filename after the uploaded part has been written to disk, or the
    /// pre-uploaded filename when the client sent plain text.
    pub cover_image: Option<String>,
}

/// DTO for login. Either email or username must identify the account.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = login_identifier_present))]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    pub username: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

fn login_identifier_present(req: &LoginRequest) -> Result<(), ValidationError> {
    if req.email.is_none() && req.username.is_none() {
        let mut err = ValidationError::new("identifier_missing");
        err.message = Some("Email or username is required.".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for profile updates. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters."
    ))]
    pub username: Option<String>,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Name must be between 3 and 30 characters."
    ))]
    pub name: Option<String>,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Surname must be between 3 and 30 characters."
    ))]
    pub surname: Option<String>,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    pub bio: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.bio.is_none()
    }
}
