use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    pagination::Page,
    user::{LeaderboardEntry, User},
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password, image, created_at, updated_at";

/// Fields written on sign-up.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub image: Option<&'a str>,
}

/// Profile changes. `image: None` keeps the current avatar.
#[derive(Debug)]
pub struct ProfileChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub image: Option<Option<&'a str>>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn create(pool: &PgPool, user: NewUser<'_>) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (first_name, last_name, email, password, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.image)
    .fetch_one(pool)
    .await
}

/// Applies `changes` in one statement and returns the updated row.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    changes: ProfileChanges<'_>,
) -> Result<User, sqlx::Error> {
    let (image_changed, image) = match changes.image {
        Some(image) => (true, image),
        None => (false, None),
    };

    let sql = format!(
        r#"
        UPDATE users
        SET first_name = $2,
            last_name = $3,
            password = COALESCE($4, password),
            image = CASE WHEN $5 THEN $6 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.password_hash)
        .bind(image_changed)
        .bind(image)
        .fetch_one(pool)
        .await
}

/// Deletes the account; topics, comments and likes go with it.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

/// Users ordered by how many comments they wrote, most first.
pub async fn leaderboard(pool: &PgPool, page: Page) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT
            u.id, u.first_name, u.last_name, u.email, u.image,
            u.created_at, u.updated_at,
            COUNT(c.id) AS comments_count
        FROM users u
        LEFT JOIN comments c ON c.user_id = u.id
        GROUP BY u.id
        ORDER BY comments_count DESC, u.created_at ASC, u.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await
}
