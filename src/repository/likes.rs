use sqlx::PgPool;
use uuid::Uuid;

use crate::models::like::LikeTarget;

/// Flips the user's like on `target` in a single statement and reports the
/// resulting state.
///
/// The delete and the conditional insert run in one CTE; the partial unique
/// indexes on `likes` turn a concurrent duplicate insert into a no-op, so
/// there is never more than one row per (user, topic, comment).
pub async fn toggle(pool: &PgPool, user_id: Uuid, target: LikeTarget) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        WITH removed AS (
            DELETE FROM likes
            WHERE user_id = $1
              AND topic_id = $2
              AND comment_id IS NOT DISTINCT FROM $3
            RETURNING id
        ), inserted AS (
            INSERT INTO likes (user_id, topic_id, comment_id)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM removed)
            ON CONFLICT DO NOTHING
            RETURNING id
        )
        SELECT NOT EXISTS (SELECT 1 FROM removed) AS liked
        "#,
    )
    .bind(user_id)
    .bind(target.topic_id())
    .bind(target.comment_id())
    .fetch_one(pool)
    .await
}

pub async fn count(pool: &PgPool, target: LikeTarget) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM likes
        WHERE topic_id = $1 AND comment_id IS NOT DISTINCT FROM $2
        "#,
    )
    .bind(target.topic_id())
    .bind(target.comment_id())
    .fetch_one(pool)
    .await
}
