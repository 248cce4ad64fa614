//! Transaction ledger
//!
//! Append-only. Rows are never updated or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::coins::Coin;
use super::users::UserSummary;
use crate::domain::TransactionKind;

/// Row of the `transactions` table
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    pub type_id: Uuid,
    pub from_coin_id: Uuid,
    pub to_coin_id: Uuid,
    pub amount_from: Decimal,
    pub amount_to: Decimal,
    pub user_id: Uuid,
    pub user_from_id: Uuid,
    pub user_to_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Values for a new ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub type_id: Uuid,
    pub from_coin_id: Uuid,
    pub to_coin_id: Uuid,
    pub amount_from: Decimal,
    pub amount_to: Decimal,
    /// Participant whose history this row belongs to
    pub user_id: Uuid,
    pub user_from_id: Uuid,
    pub user_to_id: Uuid,
}

/// Seeded transaction type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionTypeSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Ledger row joined with type, coin and participant metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    #[serde(rename = "type")]
    pub kind: TransactionTypeSummary,
    pub from_coin: Coin,
    pub to_coin: Coin,
    pub user_from: UserSummary,
    pub user_to: UserSummary,
}

#[derive(sqlx::FromRow)]
struct TransactionViewRow {
    id: Uuid,
    type_id: Uuid,
    from_coin_id: Uuid,
    to_coin_id: Uuid,
    amount_from: Decimal,
    amount_to: Decimal,
    user_id: Uuid,
    user_from_id: Uuid,
    user_to_id: Uuid,
    created_at: DateTime<Utc>,
    type_name: String,
    type_description: String,
    from_coin_symbol: String,
    from_coin_name: String,
    to_coin_symbol: String,
    to_coin_name: String,
    user_from_name: String,
    user_from_email: String,
    user_to_name: String,
    user_to_email: String,
}

impl From<TransactionViewRow> for TransactionView {
    fn from(row: TransactionViewRow) -> Self {
        Self {
            kind: TransactionTypeSummary {
                id: row.type_id,
                kind: row.type_name,
                description: row.type_description,
            },
            from_coin: Coin {
                id: row.from_coin_id,
                symbol: row.from_coin_symbol,
                name: row.from_coin_name,
            },
            to_coin: Coin {
                id: row.to_coin_id,
                symbol: row.to_coin_symbol,
                name: row.to_coin_name,
            },
            user_from: UserSummary {
                id: row.user_from_id,
                name: row.user_from_name,
                email: row.user_from_email,
            },
            user_to: UserSummary {
                id: row.user_to_id,
                name: row.user_to_name,
                email: row.user_to_email,
            },
            transaction: TransactionRecord {
                id: row.id,
                type_id: row.type_id,
                from_coin_id: row.from_coin_id,
                to_coin_id: row.to_coin_id,
                amount_from: row.amount_from,
                amount_to: row.amount_to,
                user_id: row.user_id,
                user_from_id: row.user_from_id,
                user_to_id: row.user_to_id,
                created_at: row.created_at,
            },
        }
    }
}

/// Resolve the id of a seeded transaction type
pub async fn find_type_id<'c, E>(executor: E, kind: TransactionKind) -> Result<Option<Uuid>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_scalar("SELECT id FROM transaction_types WHERE type = $1")
        .bind(kind.as_str())
        .fetch_optional(executor)
        .await
}

/// Append a ledger row
pub async fn insert<'c, E>(executor: E, new: &NewTransaction) -> Result<TransactionRecord, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, TransactionRecord>(
        r#"
        INSERT INTO transactions (
            id, type_id, from_coin_id, to_coin_id, amount_from, amount_to,
            user_id, user_from_id, user_to_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        RETURNING id, type_id, from_coin_id, to_coin_id, amount_from, amount_to,
                  user_id, user_from_id, user_to_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.type_id)
    .bind(new.from_coin_id)
    .bind(new.to_coin_id)
    .bind(new.amount_from)
    .bind(new.amount_to)
    .bind(new.user_id)
    .bind(new.user_from_id)
    .bind(new.user_to_id)
    .fetch_one(executor)
    .await
}

/// Every row attributed to a user, newest first
pub async fn list_for_user<'c, E>(executor: E, user_id: Uuid) -> Result<Vec<TransactionView>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    let rows = sqlx::query_as::<_, TransactionViewRow>(
        r#"
        SELECT
            t.id, t.type_id, t.from_coin_id, t.to_coin_id, t.amount_from, t.amount_to,
            t.user_id, t.user_from_id, t.user_to_id, t.created_at,
            tt.type AS type_name,
            tt.description AS type_description,
            fc.symbol AS from_coin_symbol,
            fc.name AS from_coin_name,
            tc.symbol AS to_coin_symbol,
            tc.name AS to_coin_name,
            uf.name AS user_from_name,
            uf.email AS user_from_email,
            ut.name AS user_to_name,
            ut.email AS user_to_email
        FROM transactions t
        JOIN transaction_types tt ON tt.id = t.type_id
        JOIN coins fc ON fc.id = t.from_coin_id
        JOIN coins tc ON tc.id = t.to_coin_id
        JOIN users uf ON uf.id = t.user_from_id
        JOIN users ut ON ut.id = t.user_to_id
        WHERE t.user_id = $1
        ORDER BY t.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(TransactionView::from).collect())
}

/// Count rows attributed to a user, optionally restricted to one kind
pub async fn count_for_user<'c, E>(
    executor: E,
    user_id: Uuid,
    kind: Option<TransactionKind>,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM transactions t
        JOIN transaction_types tt ON tt.id = t.type_id
        WHERE t.user_id = $1 AND ($2::text IS NULL OR tt.type = $2)
        "#,
    )
    .bind(user_id)
    .bind(kind.map(|k| k.as_str()))
    .fetch_one(executor)
    .await
}
