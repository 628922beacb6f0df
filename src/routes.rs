// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    handlers::{auth, comments, profile, topics, users},
    models::{
        comment::{CommentItem, CreateCommentRequest, UpdateCommentRequest},
        like::LikeStatus,
        pagination::Pagination,
        response::{Created, Empty},
        topic::{Author, SortBy, TopicItem, TopicRequest},
        user::{LeaderboardEntry, PublicUser, SignInRequest, SignUpRequest, UpdateProfileRequest},
    },
    state::AppState,
    utils::jwt::auth_middleware,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "TopicHub API"),
    paths(
        auth::signup,
        auth::signin,
        auth::current,
        auth::signout,
        profile::update_profile,
        profile::delete_profile,
        topics::list_topics,
        topics::list_my_topics,
        topics::get_topic,
        topics::create_topic,
        topics::update_topic,
        topics::delete_topic,
        topics::toggle_topic_like,
        comments::list_comments,
        comments::create_comment,
        comments::update_comment,
        comments::delete_comment,
        comments::toggle_comment_like,
        users::list_users,
    ),
    components(schemas(
        PublicUser,
        LeaderboardEntry,
        SignUpRequest,
        SignInRequest,
        UpdateProfileRequest,
        Author,
        TopicItem,
        TopicRequest,
        SortBy,
        CommentItem,
        CreateCommentRequest,
        UpdateCommentRequest,
        LikeStatus,
        Pagination,
        Created,
        Empty,
    )),
    tags(
        (name = "auth", description = "Sign up, sign in and session"),
        (name = "profile", description = "The signed-in user's account"),
        (name = "topics", description = "Topics and topic likes"),
        (name = "comments", description = "Comments on a topic"),
        (name = "users", description = "User directory"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assembles the main application router.
///
/// * Everything lives under `/api`.
/// * Session-only routes sit behind `auth_middleware`; the topic feed reads
///   the session optionally.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let session = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .merge(
            Router::new()
                .route("/current", get(auth::current))
                .route("/signout", post(auth::signout))
                .route_layer(session()),
        );

    let profile_routes = Router::new()
        .route(
            "/",
            patch(profile::update_profile).delete(profile::delete_profile),
        )
        .route("/update", post(profile::update_profile))
        .route("/delete", post(profile::delete_profile))
        .route_layer(session());

    let topic_routes = Router::new()
        .route(
            "/",
            get(topics::list_topics).merge(post(topics::create_topic).route_layer(session())),
        )
        .merge(
            Router::new()
                .route("/me", get(topics::list_my_topics))
                .route(
                    "/{topic_id}",
                    get(topics::get_topic)
                        .patch(topics::update_topic)
                        .delete(topics::delete_topic),
                )
                .route("/{topic_id}/like", post(topics::toggle_topic_like))
                .route(
                    "/{topic_id}/comments",
                    get(comments::list_comments).post(comments::create_comment),
                )
                .route(
                    "/{topic_id}/comments/{comment_id}",
                    patch(comments::update_comment).delete(comments::delete_comment),
                )
                .route(
                    "/{topic_id}/comments/{comment_id}/like",
                    post(comments::toggle_comment_like),
                )
                .route_layer(session()),
        );

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route_layer(session());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/users", user_routes)
        .route("/api-docs/openapi.json", get(openapi_json))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
