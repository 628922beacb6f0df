use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    models::{
        pagination::Page,
        topic::{Topic, TopicItem},
    },
    repository::{AUTHOR_COLUMNS, ranking::TopicRanking},
};

/// Which topics a feed covers.
#[derive(Debug, Clone, Copy)]
pub enum TopicScope {
    All,
    OwnedBy(Uuid),
}

/// SELECT list for `TopicItem` up to and including the FROM clause.
/// `viewer` decides the `liked` flag; `None` yields false everywhere.
fn item_query<'a>(viewer: Option<Uuid>) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT t.id, t.title, t.description, t.created_at, t.updated_at, {AUTHOR_COLUMNS}, \
         (SELECT COUNT(*) FROM likes l WHERE l.topic_id = t.id AND l.comment_id IS NULL) AS likes_count, \
         (SELECT COUNT(*) FROM comments c WHERE c.topic_id = t.id) AS comments_count, \
         EXISTS (SELECT 1 FROM likes l WHERE l.topic_id = t.id AND l.comment_id IS NULL AND l.user_id = "
    ));
    query.push_bind(viewer);
    query.push(") AS liked FROM topics t JOIN users u ON u.id = t.user_id");
    query
}

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: TopicScope) {
    if let TopicScope::OwnedBy(owner) = scope {
        query.push(" WHERE t.user_id = ");
        query.push_bind(owner);
    }
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(
        "SELECT id, user_id, title, description, created_at, updated_at FROM topics WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_item(
    pool: &PgPool,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<TopicItem>, sqlx::Error> {
    let mut query = item_query(viewer);
    query.push(" WHERE t.id = ");
    query.push_bind(id);

    query.build_query_as::<TopicItem>().fetch_optional(pool).await
}

pub async fn list(
    pool: &PgPool,
    scope: TopicScope,
    viewer: Option<Uuid>,
    ranking: &dyn TopicRanking,
    page: Page,
) -> Result<Vec<TopicItem>, sqlx::Error> {
    let mut query = item_query(viewer);
    push_scope(&mut query, scope);
    ranking.push_order_by(&mut query);
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    query.build_query_as::<TopicItem>().fetch_all(pool).await
}

pub async fn count(pool: &PgPool, scope: TopicScope) -> Result<i64, sqlx::Error> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM topics t");
    push_scope(&mut query, scope);

    query.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO topics (user_id, title, description)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    title: &str,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE topics SET title = $2, description = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .execute(pool)
    .await?;

    Ok(())
}

/// Comments and likes on the topic are removed by cascade.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
