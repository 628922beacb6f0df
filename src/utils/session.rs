// src/utils/session.rs

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "topichub_session";

/// Builds the session cookie: HTTP-only, strict same-site, secure.
pub fn session_cookie(token: String, max_age_seconds: u64) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(max_age_seconds).unwrap_or(i64::MAX));

    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .max_age(max_age)
        .build()
}

/// Adds a removal cookie for the session to `jar`.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn read_session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
