//! Database module
//!
//! Migrations plus schema and reference-data checks.

use sqlx::migrate::MigrateError;
use sqlx::PgPool;

use crate::domain::{TransactionKind, BRL, OPCOIN};

/// Tables the service reads or writes
const REQUIRED_TABLES: &[&str] = &[
    "users",
    "coins",
    "wallets",
    "transaction_types",
    "transactions",
    "user_profiles",
    "audit_logs",
];

/// Apply the embedded migrations in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check that required tables and reference rows exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    check_reference_data(pool).await
}

/// Check that the seeded coins and transaction types exist
async fn check_reference_data(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for symbol in [OPCOIN, BRL] {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM coins WHERE symbol = $1)")
                .bind(symbol)
                .fetch_one(pool)
                .await?;

        if !exists {
            tracing::error!("Required coin '{}' is not seeded. Please run migrations.", symbol);
            return Ok(false);
        }
    }

    for kind in [TransactionKind::Convert, TransactionKind::Transfer] {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transaction_types WHERE type = $1)")
                .bind(kind.as_str())
                .fetch_one(pool)
                .await?;

        if !exists {
            tracing::error!(
                "Required transaction type '{}' is not seeded. Please run migrations.",
                kind
            );
            return Ok(false);
        }
    }

    tracing::info!("Reference data verified: coins {}, {}; transaction types CONVERT, TRANSFER", OPCOIN, BRL);
    Ok(true)
}
