// src/handlers/mod.rs

use sqlx::PgPool;

use crate::{error::AppError, models::user::User, repository, utils::jwt::Claims};

pub mod auth;
pub mod comments;
pub mod profile;
pub mod topics;
pub mod users;

/// Resolves the signed-in user. A valid token for a deleted account is a 404.
pub(crate) async fn current_user(pool: &PgPool, claims: &Claims) -> Result<User, AppError> {
    repository::users::find_by_email(pool, &claims.email)
        .await?
        .ok_or_else(AppError::account_missing)
}
