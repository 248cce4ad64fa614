//! User records

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user, embedded in other read models
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Find a user by (normalized) email
pub async fn find_by_email<'c, E>(executor: E, email: &str) -> Result<Option<UserRecord>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT id, email, password_hash, name, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// Insert a new user. Fails with a unique violation when the email exists.
pub async fn insert<'c, E>(
    executor: E,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<UserRecord, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        RETURNING id, email, password_hash, name, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .fetch_one(executor)
    .await
}

/// Count users with the given email (0 or 1)
pub async fn count_by_email<'c, E>(executor: E, email: &str) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(executor)
        .await
}
