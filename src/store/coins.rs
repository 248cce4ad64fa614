//! Coin registry (read-only, seeded by migration)

use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Row of the `coins` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Coin {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
}

/// Find a coin by its symbol
pub async fn find_by_symbol<'c, E>(executor: E, symbol: &str) -> Result<Option<Coin>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Coin>("SELECT id, symbol, name FROM coins WHERE symbol = $1")
        .bind(symbol)
        .fetch_optional(executor)
        .await
}
