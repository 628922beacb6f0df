// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, utils::session::read_session_token};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Email of the signed-in user.
    pub email: String,
    /// Expiration time as Unix timestamp.
    pub exp: i64,
}

/// Signs a new session token for `email`, valid for `expiration_seconds`.
pub fn sign_jwt(email: &str, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let lifetime = i64::try_from(expiration_seconds)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let claims = Claims {
        email: email.to_owned(),
        exp: chrono::Utc::now().timestamp() + lifetime,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Signature, shape and expiry failures all collapse into the same
/// generic `AppError::AuthError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Session token rejected: {}", e);
        AppError::unauthorized()
    })?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Reads the session cookie and verifies it.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If missing or invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = read_session_token(req.headers()).ok_or_else(AppError::unauthorized)?;
    let claims = verify_jwt(&token, &config.jwt_secret)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Optional session: `Some` for a valid cookie, `None` for anonymous callers.
/// Never rejects the request.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Claims>);

impl<S> FromRequestParts<S> for Viewer
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Viewer(Some(claims.clone())));
        }

        let config = Config::from_ref(state);
        let claims = read_session_token(&parts.headers)
            .and_then(|token| verify_jwt(&token, &config.jwt_secret).ok());

        Ok(Viewer(claims))
    }
}
