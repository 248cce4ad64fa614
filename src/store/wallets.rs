//! Wallet balances
//!
//! One row per (user, coin). Balance changes go through `lock_*` followed by
//! `set_balance` inside the caller's transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::coins::Coin;

/// Row of the `wallets` table
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coin_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wallet joined with its coin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    #[serde(flatten)]
    pub wallet: Wallet,
    pub coin: Coin,
}

#[derive(sqlx::FromRow)]
struct WalletViewRow {
    id: Uuid,
    user_id: Uuid,
    coin_id: Uuid,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    coin_symbol: String,
    coin_name: String,
}

impl From<WalletViewRow> for WalletView {
    fn from(row: WalletViewRow) -> Self {
        Self {
            wallet: Wallet {
                id: row.id,
                user_id: row.user_id,
                coin_id: row.coin_id,
                balance: row.balance,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            coin: Coin {
                id: row.coin_id,
                symbol: row.coin_symbol,
                name: row.coin_name,
            },
        }
    }
}

/// Create a wallet with an opening balance
pub async fn insert<'c, E>(
    executor: E,
    user_id: Uuid,
    coin_id: Uuid,
    balance: Decimal,
) -> Result<Wallet, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        INSERT INTO wallets (id, user_id, coin_id, balance, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        RETURNING id, user_id, coin_id, balance, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(coin_id)
    .bind(balance)
    .fetch_one(executor)
    .await
}

/// Lock one user's wallets for the given coins.
///
/// Rows are locked in wallet id order; missing wallets are simply absent
/// from the result.
pub async fn lock_for_user_coins<'c, E>(
    executor: E,
    user_id: Uuid,
    coin_ids: &[Uuid],
) -> Result<Vec<Wallet>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT id, user_id, coin_id, balance, created_at, updated_at
        FROM wallets
        WHERE user_id = $1 AND coin_id = ANY($2)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(coin_ids)
    .fetch_all(executor)
    .await
}

/// Lock several users' wallets for one coin, in wallet id order
pub async fn lock_for_users_coin<'c, E>(
    executor: E,
    user_ids: &[Uuid],
    coin_id: Uuid,
) -> Result<Vec<Wallet>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT id, user_id, coin_id, balance, created_at, updated_at
        FROM wallets
        WHERE user_id = ANY($1) AND coin_id = $2
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(user_ids)
    .bind(coin_id)
    .fetch_all(executor)
    .await
}

/// Overwrite a wallet balance. Callers must hold the row lock.
pub async fn set_balance<'c, E>(
    executor: E,
    wallet_id: Uuid,
    balance: Decimal,
) -> Result<Wallet, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET balance = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, coin_id, balance, created_at, updated_at
        "#,
    )
    .bind(wallet_id)
    .bind(balance)
    .fetch_one(executor)
    .await
}

/// All wallets of a user with coin metadata
pub async fn list_for_user<'c, E>(executor: E, user_id: Uuid) -> Result<Vec<WalletView>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    let rows = sqlx::query_as::<_, WalletViewRow>(
        r#"
        SELECT
            w.id, w.user_id, w.coin_id, w.balance, w.created_at, w.updated_at,
            c.symbol AS coin_symbol,
            c.name AS coin_name
        FROM wallets w
        JOIN coins c ON c.id = w.coin_id
        WHERE w.user_id = $1
        ORDER BY c.symbol
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(WalletView::from).collect())
}

/// Balance of a user's wallet for a coin symbol, if the wallet exists
pub async fn balance_of<'c, E>(
    executor: E,
    user_id: Uuid,
    symbol: &str,
) -> Result<Option<Decimal>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_scalar(
        r#"
        SELECT w.balance
        FROM wallets w
        JOIN coins c ON c.id = w.coin_id
        WHERE w.user_id = $1 AND c.symbol = $2
        "#,
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(executor)
    .await
}
