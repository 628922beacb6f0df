use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::current_user,
    models::{
        response::ApiResponse,
        user::{PublicUser, UpdateProfileRequest},
    },
    repository::users::{self, ProfileChanges},
    state::AppState,
    utils::{
        extract::AppJson,
        hash::{hash_password_blocking, verify_password_blocking},
        text::clean_optional,
        jwt::Claims,
        session::clear_session,
    },
};

/// Update names, avatar and (with the old one) the password.
#[utoipa::path(
    patch,
    path = "/api/profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = PublicUser),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "No valid session or wrong old password"),
        (status = 404, description = "Account does not exist"),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.trimmed();
    payload.validate()?;

    let user = current_user(&state.pool, &claims).await?;

    let password_hash = match payload.password_change() {
        Some((old, new)) => {
            let confirmed =
                verify_password_blocking(old.to_string(), user.password.clone()).await?;
            if !confirmed {
                return Err(AppError::AuthError("Invalid password".to_string()));
            }
            Some(hash_password_blocking(new.to_string()).await?)
        }
        None => None,
    };

    let first_name = clean_optional(payload.first_name.as_deref());
    let last_name = clean_optional(payload.last_name.as_deref());
    let image = payload
        .image
        .as_deref()
        .map(|url| Some(url.trim()).filter(|url| !url.is_empty()));

    let updated = users::update_profile(
        &state.pool,
        user.id,
        ProfileChanges {
            first_name: first_name.as_deref(),
            last_name: last_name.as_deref(),
            password_hash: password_hash.as_deref(),
            image,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        password_changed = password_hash.is_some(),
        "Profile updated"
    );

    Ok(Json(ApiResponse::new(
        "You have successfully updated your profile",
        PublicUser::from(updated),
    )))
}

/// Delete the account and everything it owns, then end the session.
#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Account deleted, session cookie cleared"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Account does not exist"),
    )
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;

    if !users::delete(&state.pool, user.id).await? {
        return Err(AppError::account_missing());
    }

    tracing::info!(user_id = %user.id, "Account deleted");

    Ok((
        clear_session(jar),
        Json(ApiResponse::message("You have successfully deleted your account")),
    ))
}
