// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    handlers::current_user,
    models::{
        response::ApiResponse,
        user::{PublicUser, SignInRequest, SignUpRequest},
    },
    repository::users::{self, NewUser},
    state::AppState,
    utils::{
        extract::AppJson,
        hash::{hash_password_blocking, verify_password_blocking},
        text::clean_optional,
        jwt::{Claims, sign_jwt},
        session::{clear_session, session_cookie},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const ACCOUNT_EXISTS: &str = "This account already exists";

/// Registers a new account.
///
/// Hashes the password with Argon2 and looks up an avatar on a best-effort
/// basis. Does not sign the user in.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid input or email already registered"),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.trimmed();
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let first_name = clean_optional(payload.first_name.as_deref());
    let last_name = clean_optional(payload.last_name.as_deref());

    if users::email_exists(&state.pool, &email).await? {
        return Err(AppError::BadRequest(ACCOUNT_EXISTS.to_string()));
    }

    let password_hash = hash_password_blocking(payload.password).await?;
    let image = state.avatars.avatar_for(&email).await;

    let id = users::create(
        &state.pool,
        NewUser {
            first_name: first_name.as_deref(),
            last_name: last_name.as_deref(),
            email: &email,
            password_hash: &password_hash,
            image: image.as_deref(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest(ACCOUNT_EXISTS.to_string())
        } else {
            tracing::error!("Failed to sign up user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = %id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("You have successfully signed up")),
    ))
}

/// Verifies credentials and issues the session cookie.
///
/// Unknown email and wrong password give the same answer.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = PublicUser),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();

    let Some(user) = users::find_by_email(&state.pool, &email).await? else {
        tracing::debug!("Sign-in for unknown account");
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password_blocking(payload.password, user.password.clone()).await? {
        tracing::debug!(user_id = %user.id, "Sign-in with wrong password");
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let token = sign_jwt(&user.email, &state.config.jwt_secret, state.config.jwt_expiration)?;
    let jar = jar.add(session_cookie(token, state.config.jwt_expiration));

    tracing::info!(user_id = %user.id, "User signed in");

    Ok((
        jar,
        Json(ApiResponse::new(
            "You have successfully signed in",
            PublicUser::from(user),
        )),
    ))
}

/// Returns the signed-in user's public profile.
#[utoipa::path(
    get,
    path = "/api/auth/current",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn current(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;

    Ok(Json(ApiResponse::new("", PublicUser::from(user))))
}

/// Clears the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    tag = "auth",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn signout(
    jar: CookieJar,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(email = %claims.email, "User signed out");

    Ok((
        clear_session(jar),
        Json(ApiResponse::message("You have successfully signed out")),
    ))
}
