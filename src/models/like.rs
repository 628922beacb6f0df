use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// What a like points at. A like on a comment still records its topic so
/// deleting the topic removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Topic { topic_id: Uuid },
    Comment { topic_id: Uuid, comment_id: Uuid },
}

impl LikeTarget {
    pub fn topic_id(&self) -> Uuid {
        match *self {
            LikeTarget::Topic { topic_id } | LikeTarget::Comment { topic_id, .. } => topic_id,
        }
    }

    /// Value of the nullable `likes.comment_id` column.
    pub fn comment_id(&self) -> Option<Uuid> {
        match *self {
            LikeTarget::Topic { .. } => None,
            LikeTarget::Comment { comment_id, .. } => Some(comment_id),
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_mapping() {
        let topic_id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();

        let on_topic = LikeTarget::Topic { topic_id };
        assert_eq!(on_topic.topic_id(), topic_id);
        assert_eq!(on_topic.comment_id(), None);

        let on_comment = LikeTarget::Comment { topic_id, comment_id };
        assert_eq!(on_comment.topic_id(), topic_id);
        assert_eq!(on_comment.comment_id(), Some(comment_id));
    }
}
