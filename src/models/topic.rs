use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::ownership::Owned;

/// Represents the 'topics' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Topic {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn kind(&self) -> &'static str {
        "topic"
    }
}

/// Display fields of the user who wrote a topic or comment.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[sqlx(rename = "author_id")]
    pub id: Uuid,
    #[sqlx(rename = "author_first_name")]
    pub first_name: Option<String>,
    #[sqlx(rename = "author_last_name")]
    pub last_name: Option<String>,
    #[sqlx(rename = "author_email")]
    pub email: String,
    #[sqlx(rename = "author_image")]
    pub image: Option<String>,
}

/// A topic as shown in feeds and on its own page, with aggregates.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub user: Author,
    /// Likes on the topic itself (comment likes excluded).
    pub likes_count: i64,
    pub comments_count: i64,
    /// Whether the requesting user liked this topic.
    #[serde(rename = "like")]
    pub liked: bool,
}

/// DTO for creating or editing a topic.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TopicRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

impl TopicRequest {
    /// Trims before validating so a blank title is rejected.
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.map(|d| d.trim().to_string()),
        }
    }
}

/// Feed ordering requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    #[serde(alias = "latestTopics")]
    Latest,
    #[serde(alias = "hotTopics")]
    Hot,
}

/// Query parameters for the public topic feed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<SortBy>,
}
