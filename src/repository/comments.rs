use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{
        comment::{Comment, CommentItem},
        pagination::Page,
    },
    repository::AUTHOR_COLUMNS,
};

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, user_id, topic_id, parent_comment_id, content, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn count_for_topic(pool: &PgPool, topic_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE topic_id = $1")
        .bind(topic_id)
        .fetch_one(pool)
        .await
}

/// Newest first, with per-comment like counts and the viewer's like flag.
pub async fn list_for_topic(
    pool: &PgPool,
    topic_id: Uuid,
    viewer: Uuid,
    page: Page,
) -> Result<Vec<CommentItem>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT
            c.id, c.topic_id, c.parent_comment_id, c.content,
            c.created_at, c.updated_at,
            {AUTHOR_COLUMNS},
            (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes_count,
            EXISTS (SELECT 1 FROM likes l WHERE l.comment_id = c.id AND l.user_id = $2) AS liked
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.topic_id = $1
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $3 OFFSET $4
        "#
    );

    sqlx::query_as::<_, CommentItem>(&sql)
        .bind(topic_id)
        .bind(viewer)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    topic_id: Uuid,
    parent_comment_id: Option<Uuid>,
    content: &str,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO comments (user_id, topic_id, parent_comment_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .bind(parent_comment_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, content: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(content)
        .execute(pool)
        .await?;

    Ok(())
}

/// Replies and likes on the comment are removed by cascade.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
