//! Investor profiles

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::InvestorProfile;

/// Row of the `user_profiles` table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile: InvestorProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    profile: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = sqlx::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let profile = row.profile.parse().map_err(|e: crate::domain::DomainError| {
            sqlx::Error::Decode(Box::new(e))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            profile,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The user's profile, if any
pub async fn find_by_user<'c, E>(executor: E, user_id: Uuid) -> Result<Option<ProfileRecord>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, ProfileRow>(
        "SELECT id, user_id, profile, created_at, updated_at FROM user_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?
    .map(ProfileRecord::try_from)
    .transpose()
}

/// Create the user's profile. Returns `None` when one already exists.
pub async fn insert<'c, E>(
    executor: E,
    user_id: Uuid,
    profile: InvestorProfile,
) -> Result<Option<ProfileRecord>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO user_profiles (id, user_id, profile, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        ON CONFLICT (user_id) DO NOTHING
        RETURNING id, user_id, profile, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(profile.as_str())
    .fetch_optional(executor)
    .await?
    .map(ProfileRecord::try_from)
    .transpose()
}

/// Replace the user's profile. Returns `None` when the user has none.
pub async fn update<'c, E>(
    executor: E,
    user_id: Uuid,
    profile: InvestorProfile,
) -> Result<Option<ProfileRecord>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE user_profiles
        SET profile = $2, updated_at = NOW()
        WHERE user_id = $1
        RETURNING id, user_id, profile, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(profile.as_str())
    .fetch_optional(executor)
    .await?
    .map(ProfileRecord::try_from)
    .transpose()
}

/// Remove the user's profile. Returns whether a row was deleted.
pub async fn delete<'c, E>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
