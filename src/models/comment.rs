use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{models::topic::Author, utils::ownership::Owned};

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn kind(&self) -> &'static str {
        "comment"
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,

    /// Optional: the comment being replied to.
    pub parent_comment_id: Option<Uuid>,
}

/// DTO for editing a comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,
}

impl CreateCommentRequest {
    /// Trims before validating so the limits apply to the stored text.
    pub fn trimmed(self) -> Self {
        Self {
            content: self.content.trim().to_string(),
            ..self
        }
    }
}

impl UpdateCommentRequest {
    pub fn trimmed(self) -> Self {
        Self {
            content: self.content.trim().to_string(),
        }
    }
}

/// A comment with its author and like aggregates.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentItem {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub user: Author,
    pub likes_count: i64,
    #[serde(rename = "like")]
    pub liked: bool,
}
