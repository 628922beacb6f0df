//! Feed ordering strategies.

use std::fmt::Debug;

use sqlx::{Postgres, QueryBuilder};

/// Appends an `ORDER BY` clause for a query over `topics t`.
pub trait TopicRanking: Debug + Send + Sync {
    fn push_order_by(&self, query: &mut QueryBuilder<'_, Postgres>);
}

/// Newest first. The only ordering clients may rely on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latest;

impl TopicRanking for Latest {
    fn push_order_by(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" ORDER BY t.created_at DESC, t.id DESC");
    }
}

/// Topic likes plus comments received in the last `window_hours`,
/// ties broken newest first.
#[derive(Debug, Clone, Copy)]
pub struct Engagement {
    pub window_hours: i32,
}

impl TopicRanking for Engagement {
    fn push_order_by(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(
            " ORDER BY ((SELECT COUNT(*) FROM likes hl \
             WHERE hl.topic_id = t.id AND hl.comment_id IS NULL \
             AND hl.created_at > NOW() - make_interval(hours => ",
        );
        query.push_bind(self.window_hours);
        query.push(
            ")) + (SELECT COUNT(*) FROM comments hc \
             WHERE hc.topic_id = t.id AND hc.created_at > NOW() - make_interval(hours => ",
        );
        query.push_bind(self.window_hours);
        query.push(")) DESC, t.created_at DESC, t.id DESC");
    }
}
