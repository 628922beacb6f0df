// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    /// Argon2 password hash. Never serialized.
    pub password: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The profile fields that are safe to show to anyone signed in.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            image: user.image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Leaderboard row: a user and how many comments they wrote.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: PublicUser,
    pub comments_count: i64,
}

/// DTO for creating a new account.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(max = 50, message = "First name cannot exceed 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, message = "Last name cannot exceed 50 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters"
    ))]
    pub password: String,
}

impl SignUpRequest {
    /// Trims names before validating so the 50-char limit applies to what is stored.
    pub fn trimmed(self) -> Self {
        Self {
            first_name: trim_name(self.first_name),
            last_name: trim_name(self.last_name),
            ..self
        }
    }
}

/// DTO for signing in.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// DTO for profile updates.
///
/// Passwords travel in pairs: the old one proves identity, the new one
/// replaces it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_password_pair"))]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "First name cannot exceed 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, message = "Last name cannot exceed 50 characters"))]
    pub last_name: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    /// Avatar URL. Empty string clears it, absent keeps it.
    #[validate(custom(function = "validate_image_url"))]
    pub image: Option<String>,
}

impl UpdateProfileRequest {
    /// Trims names before validating. Passwords are left as typed.
    pub fn trimmed(self) -> Self {
        Self {
            first_name: trim_name(self.first_name),
            last_name: trim_name(self.last_name),
            ..self
        }
    }

    /// Both passwords, if a change was requested.
    pub fn password_change(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.old_password), non_empty(&self.new_password)) {
            (Some(old), Some(new)) => Some((old, new)),
            _ => None,
        }
    }
}

fn trim_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn validate_password_pair(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    let old = non_empty(&req.old_password);
    let new = non_empty(&req.new_password);

    match (old, new) {
        (Some(_), None) => Err(ValidationError::new("new_password")
            .with_message("Please provide the new password".into())),
        (None, Some(_)) => Err(ValidationError::new("old_password")
            .with_message("Please provide the old password".into())),
        (Some(_), Some(new)) if new.chars().count() < 8 => Err(ValidationError::new("new_password")
            .with_message("Minimum 8 characters required".into())),
        (Some(_), Some(new)) if new.chars().count() > 128 => Err(ValidationError::new("new_password")
            .with_message("Maximum 128 characters allowed".into())),
        _ => Ok(()),
    }
}

fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ValidationError::new("image").with_message("Image must be an http(s) URL".into())),
    }
}
