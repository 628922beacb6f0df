use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    repository::ranking::{Engagement, TopicRanking},
    utils::avatar::{AvatarSource, NoAvatar, RemoteAvatar},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// Strategy behind `sortBy=hot`.
    pub hot_ranking: Arc<dyn TopicRanking>,
    pub avatars: Arc<dyn AvatarSource>,
}

impl AppState {
    /// Builds the state with the default hot ranking and, when configured,
    /// the remote avatar service.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let avatars: Arc<dyn AvatarSource> = match config.avatar_api_url.as_deref() {
            Some(url) => match RemoteAvatar::new(url) {
                Ok(remote) => Arc::new(remote),
                Err(e) => {
                    tracing::warn!("Avatar service disabled: {}", e);
                    Arc::new(NoAvatar)
                }
            },
            None => Arc::new(NoAvatar),
        };

        let hot_ranking = Arc::new(Engagement {
            window_hours: config.hot_window_hours,
        });

        Self {
            pool,
            config,
            hot_ranking,
            avatars,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
