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
    handlers::{current_user, topics::find_topic},
    models::{
        comment::{Comment, CommentItem, CreateCommentRequest, UpdateCommentRequest},
        like::{LikeStatus, LikeTarget},
        pagination::PageParams,
        response::{ApiResponse, Created, Paginated},
        topic::Topic,
    },
    repository::{comments, likes},
    state::AppState,
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        jwt::Claims,
        ownership::{Action, ensure_owner},
    },
};

/// Looks up a comment and checks it hangs off `topic`.
async fn find_comment_in(state: &AppState, topic: &Topic, comment_id: Uuid) -> Result<Comment, AppError> {
    let comment = comments::find(&state.pool, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("This comment does not exist".to_string()))?;

    if comment.topic_id != topic.id {
        return Err(AppError::NotFound(
            "This comment does not belong to this topic".to_string(),
        ));
    }

    Ok(comment)
}

/// Comments on a topic, newest first.
#[utoipa::path(
    get,
    path = "/api/topics/{topic_id}/comments",
    tag = "comments",
    params(
        ("topic_id" = Uuid, Path, description = "Topic id"),
        ("page" = Option<i64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 5, max 100"),
    ),
    responses(
        (status = 200, description = "Paginated comments", body = [CommentItem]),
        (status = 404, description = "Topic does not exist"),
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.resolve()?;
    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;

    let total = comments::count_for_topic(&state.pool, topic.id).await?;
    let items = comments::list_for_topic(&state.pool, topic.id, user.id, page).await?;

    Ok(Json(Paginated::new(items, page.pagination(total))))
}

#[utoipa::path(
    post,
    path = "/api/topics/{topic_id}/comments",
    tag = "comments",
    params(("topic_id" = Uuid, Path, description = "Topic id")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Created),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Topic or parent comment does not exist"),
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(topic_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.trimmed();
    payload.validate()?;
    let content = payload.content.as_str();

    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;

    if let Some(parent_id) = payload.parent_comment_id {
        find_comment_in(&state, &topic, parent_id).await?;
    }

    let id = comments::create(
        &state.pool,
        user.id,
        topic.id,
        payload.parent_comment_id,
        content,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(comment_id = %id, topic_id = %topic.id, "Comment created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "You have successfully created your comment",
            Created { id },
        )),
    ))
}

/// Owner only.
#[utoipa::path(
    patch,
    path = "/api/topics/{topic_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("topic_id" = Uuid, Path, description = "Topic id"),
        ("comment_id" = Uuid, Path, description = "Comment id"),
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated"),
        (status = 403, description = "Not the comment owner"),
        (status = 404, description = "Topic or comment does not exist"),
    )
)]
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((topic_id, comment_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.trimmed();
    payload.validate()?;
    let content = payload.content.as_str();

    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;
    let comment = find_comment_in(&state, &topic, comment_id).await?;
    ensure_owner(user.id, &comment, Action::Update)?;

    comments::update(&state.pool, comment.id, content).await?;

    tracing::info!(comment_id = %comment.id, "Comment updated");

    Ok(Json(ApiResponse::message(
        "You have successfully updated your comment",
    )))
}

/// Owner only. Replies and likes go with it.
#[utoipa::path(
    delete,
    path = "/api/topics/{topic_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("topic_id" = Uuid, Path, description = "Topic id"),
        ("comment_id" = Uuid, Path, description = "Comment id"),
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the comment owner"),
        (status = 404, description = "Topic or comment does not exist"),
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((topic_id, comment_id)): AppPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;
    let comment = find_comment_in(&state, &topic, comment_id).await?;
    ensure_owner(user.id, &comment, Action::Delete)?;

    comments::delete(&state.pool, comment.id).await?;

    tracing::info!(comment_id = %comment.id, "Comment deleted");

    Ok(Json(ApiResponse::message(
        "You have successfully deleted your comment",
    )))
}

#[utoipa::path(
    post,
    path = "/api/topics/{topic_id}/comments/{comment_id}/like",
    tag = "comments",
    params(
        ("topic_id" = Uuid, Path, description = "Topic id"),
        ("comment_id" = Uuid, Path, description = "Comment id"),
    ),
    responses(
        (status = 200, description = "New like state", body = LikeStatus),
        (status = 404, description = "Topic or comment does not exist"),
    )
)]
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((topic_id, comment_id)): AppPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state.pool, &claims).await?;
    let topic = find_topic(&state, topic_id).await?;
    let comment = find_comment_in(&state, &topic, comment_id).await?;

    let target = LikeTarget::Comment {
        topic_id: topic.id,
        comment_id: comment.id,
    };
    let liked = likes::toggle(&state.pool, user.id, target).await?;
    let likes_count = likes::count(&state.pool, target).await?;

    Ok(Json(ApiResponse::new("", LikeStatus { liked, likes_count })))
}
