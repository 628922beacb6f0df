use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{pagination::PageParams, response::Paginated, user::LeaderboardEntry},
    repository::users,
    state::AppState,
    utils::extract::AppQuery,
};

/// Directory of users, most active commenters first.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 5, max 100"),
    ),
    responses(
        (status = 200, description = "Paginated leaderboard", body = [LeaderboardEntry]),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.resolve()?;

    let total = users::count(&state.pool).await?;
    let entries = users::leaderboard(&state.pool, page).await?;

    Ok(Json(Paginated::new(entries, page.pagination(total))))
}
