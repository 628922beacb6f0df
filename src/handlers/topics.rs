use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::current_user,
    models::{
        like::{LikeStatus, LikeTarget},
        pagination::{Page, PageParams},
        response::{ApiResponse, Created, Paginated},
        topic::{SortBy, Topic, TopicItem, TopicListParams, TopicRequest},
    },
    repository::{
        self,
        likes,
        ranking::{Latest, TopicRanking},
        topics::{self, TopicScope},
    },
    state::AppState,
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        text::clean_optional,
        jwt::{Claims, Viewer},
        ownership::{Action, ensure_owner},
    },
};

pub(crate) async fn find_topic(state: &AppState, topic_id: Uuid) -> Result<Topic, AppError> {
    topics::find(&state.pool, topic_id)
        .await?
        .ok_or_else(|| AppError::NotFound("This topic does not exist".to_string()))
}

/// Trimmed title and description; an empty description becomes NULL.
fn clean_topic(payload: TopicRequest) -> Result<(String, Option<String>), AppError> {
    let payload = payload.trimmed();
    payload.validate()?;

    let description = clean_optional(payload.description.as_deref());
    Ok((payload.title, description))
}

/// Public topic feed. Signed-in viewers also get their own `like` flags.
#[utoipa::path(
    get,
    path = "/api/topics",
    tag = "topics",
    params(
        ("page" = Option<i64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 5, max 100"),
        ("sortBy" = Option<SortBy>, Query, description = "latest (default) or hot"),
    ),
    responses(
        (status = 200, description = "Paginated topics", body = [TopicItem]),
        (status = 400, description = "Invalid pagination"),
    )
)]
pub async fn list_topics(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    AppQuery(params): AppQuery<TopicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(params.page, params.limit)?;

    // Anonymous callers and stale tokens both see the feed without like flags.
    let viewer_id = match viewer {
        Some(claims) => repository::users::find_by_email(&state.pool, &claims.email)
            .await?
            .map(|user| user.id),
        None => None,
    };

    let ranking: &dyn TopicRanking = match params.sort_by.unwrap_or_default() {
        SortBy::Latest => &Latest,
        SortBy::Hot => state.hot_ranking.as_ref(),
    };

    let total = topics::count(&state.pool, TopicScope::All).await?;
    let items = topics::list(&state.pool, TopicScope::All, viewer_id, ranking, page).await?;

    Ok(Json(Paginated::new(items, page.pagination(total))))
}

/// The requester's own topics, newest first.
#[utoipa::path(
    get,
    path = "/api/topics/me",
    tag = "topics",
    params(
        ("page" = Option<i64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 5, max 100"),
    ),
    responses(
        (status = 200, description = "Paginated topics", body = [TopicItem]),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn list_my_topics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.resolve()?;
    let user = current_user(&state.pool, &claims).await?;
    let scope = TopicScope::OwnedBy(user.id);

    let total = topics::count(&state.pool, scope).await?;
    let items = topics::list(&state.pool, scope, Some(user.id), &Latest, page).await?;

    Ok(Json(Paginated::new(items, page.pagination(total))))
}

#[utoipa::path(
    get,
    path = "/api/topics/{topic_id}",
    tag = "topics",
    params(("topic_id" = Uuid, Path, description = "Topic id")),
    responses(
        (status = 200, description = "Topic with aggregates", body = TopicItem),
        (status = 404, description = "Topic does not exist"),
    )
)]
pub async fn get_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;

    let topic = topics::find_item(&state.pool, topic_id, Some(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("This topic does not exist".to_string()))?;

    Ok(Json(ApiResponse::new("", topic)))
}

#[utoipa::path(
    post,
    path = "/api/topics",
    tag = "topics",
    request_body = TopicRequest,
    responses(
        (status = 201, description = "Topic created", body = Created),
        (status = 400, description = "Invalid input"),
    )
)]
pub async fn create_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<TopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (title, description) = clean_topic(payload)?;
    let user = current_user(&state.pool, &claims).await?;

    let id = topics::create(&state.pool, user.id, &title, description.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create topic: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(topic_id = %id, user_id = %user.id, "Topic created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "You have successfully created your topic",
            Created { id },
        )),
    ))
}

/// Owner only.
#[utoipa::path(
    patch,
    path = "/api/topics/{topic_id}",
    tag = "topics",
    params(("topic_id" = Uuid, Path, description = "Topic id")),
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Topic updated"),
        (status = 403, description = "Not the topic owner"),
        (status = 404, description = "Topic does not exist"),
    )
)]
pub async fn update_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
    AppJson(payload): AppJson<TopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (title, description) = clean_topic(payload)?;

    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;
    ensure_owner(user.id, &topic, Action::Update)?;

    topics::update(&state.pool, topic.id, &title, description.as_deref()).await?;

    tracing::info!(topic_id = %topic.id, "Topic updated");

    Ok(Json(ApiResponse::message(
        "You have successfully updated your topic",
    )))
}

/// Owner only. Comments and likes go with it.
#[utoipa::path(
    delete,
    path = "/api/topics/{topic_id}",
    tag = "topics",
    params(("topic_id" = Uuid, Path, description = "Topic id")),
    responses(
        (status = 200, description = "Topic deleted"),
        (status = 403, description = "Not the topic owner"),
        (status = 404, description = "Topic does not exist"),
    )
)]
pub async fn delete_topic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;
    ensure_owner(user.id, &topic, Action::Delete)?;

    topics::delete(&state.pool, topic.id).await?;

    tracing::info!(topic_id = %topic.id, "Topic deleted");

    Ok(Json(ApiResponse::message(
        "You have successfully deleted your topic",
    )))
}

/// Like the topic, or take the like back.
#[utoipa::path(
    post,
    path = "/api/topics/{topic_id}/like",
    tag = "topics",
    params(("topic_id" = Uuid, Path, description = "Topic id")),
    responses(
        (status = 200, description = "New like state", body = LikeStatus),
        (status = 404, description = "Topic does not exist"),
    )
)]
pub async fn toggle_topic_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;

    let target = LikeTarget::Topic { topic_id: topic.id };
    let liked = likes::toggle(&state.pool, user.id, target).await?;
    let likes_count = likes::count(&state.pool, target).await?;

    Ok(Json(ApiResponse::new("", LikeStatus { liked, likes_count })))
}
