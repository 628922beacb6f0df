// src/utils/avatar.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Resolves an avatar image URL for a new account.
///
/// Best effort: `None` on any failure, never an error.
#[async_trait]
pub trait AvatarSource: Send + Sync {
    async fn avatar_for(&self, unique: &str) -> Option<String>;
}

/// No avatar service configured.
pub struct NoAvatar;

#[async_trait]
impl AvatarSource for NoAvatar {
    async fn avatar_for(&self, _unique: &str) -> Option<String> {
        None
    }
}

/// Image-per-string service such as RoboHash: `{base}/{unique}.png`.
pub struct RemoteAvatar {
    base: Url,
    client: reqwest::Client,
}

impl RemoteAvatar {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let base = Url::parse(base_url).map_err(|e| format!("invalid avatar url: {e}"))?;
        if base.cannot_be_a_base() {
            return Err(format!("avatar url '{base_url}' cannot be a base"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| e.to_string())?;

        Ok(Self { base, client })
    }

    /// `{base}/{percent-encoded unique}.png`
    pub fn url_for(&self, unique: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{unique}.png"));
        }
        url
    }
}

#[async_trait]
impl AvatarSource for RemoteAvatar {
    async fn avatar_for(&self, unique: &str) -> Option<String> {
        let url = self.url_for(unique);

        let response = match self.client.head(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Avatar lookup failed: {}", e);
                return None;
            }
        };

        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("image"));

        if response.status().is_success() && is_image {
            Some(url.to_string())
        } else {
            tracing::warn!(status = %response.status(), "Avatar service returned no image");
            None
        }
    }
}
