//! Ledger Integration Tests
//!
//! Exercise the handlers directly against PostgreSQL and check balances and
//! ledger rows by re-reading them. Skipped without DATABASE_URL.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use bankop::audit::AuditLogService;
use bankop::auth::TokenService;
use bankop::domain::{DomainError, OperationContext, TransactionKind, BRL, OPCOIN};
use bankop::handlers::{
    ConvertCommand, ConvertHandler, RegisterCommand, RegisterHandler, TransferCommand,
    TransferHandler,
};
use bankop::store::{transactions, wallets};
use bankop::AppError;

mod common;

use common::{unique_email, TEST_JWT_SECRET, TEST_PASSWORD};

async fn register_user(pool: &PgPool, prefix: &str) -> (Uuid, String) {
    let email = unique_email(prefix);
    let handler = RegisterHandler::new(pool.clone(), TokenService::new(TEST_JWT_SECRET, 1));
    let result = handler
        .execute(
            RegisterCommand::new(&email, TEST_PASSWORD.to_string(), prefix),
            &OperationContext::new(),
        )
        .await
        .expect("registration failed");
    (result.user_id, email)
}

async fn balance(pool: &PgPool, user_id: Uuid, symbol: &str) -> Decimal {
    wallets::balance_of(pool, user_id, symbol)
        .await
        .unwrap()
        .expect("wallet missing")
}

async fn ledger_rows(pool: &PgPool, user_id: Uuid, kind: TransactionKind) -> i64 {
    transactions::count_for_user(pool, user_id, Some(kind)).await.unwrap()
}

fn context(user_id: Uuid) -> OperationContext {
    OperationContext::new()
        .with_request_user(user_id)
        .with_correlation_id(Uuid::new_v4())
}

// =========================================================================
// Registration
// =========================================================================

#[tokio::test]
async fn test_registration_creates_two_wallets() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "wallets").await;

    let wallets = wallets::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(wallets.len(), 2);
    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(5000));
    assert_eq!(balance(&pool, user_id, BRL).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_duplicate_registration_creates_nothing() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_, email) = register_user(&pool, "twice").await;

    let handler = RegisterHandler::new(pool.clone(), TokenService::new(TEST_JWT_SECRET, 1));
    let result = handler
        .execute(
            RegisterCommand::new(&email, TEST_PASSWORD.to_string(), "Twice"),
            &OperationContext::new(),
        )
        .await;
    assert!(matches!(result, Err(AppError::Domain(DomainError::EmailTaken(_)))));

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);

    let wallets: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM wallets w JOIN users u ON u.id = w.user_id WHERE u.email = $1",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(wallets, 2);
}

// =========================================================================
// Convert
// =========================================================================

#[tokio::test]
async fn test_convert_updates_both_wallets() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "convert").await;

    let result = ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(user_id, dec!(50)), &context(user_id))
        .await
        .unwrap();

    assert_eq!(result.op_coin_balance, dec!(4950));
    assert_eq!(result.brl_balance, dec!(10));
    assert_eq!(result.transaction.amount_from, dec!(50));
    assert_eq!(result.transaction.amount_to, dec!(10));
    assert_eq!(result.transaction.user_from_id, user_id);
    assert_eq!(result.transaction.user_to_id, user_id);

    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(4950));
    assert_eq!(balance(&pool, user_id, BRL).await, dec!(10));
    assert_eq!(ledger_rows(&pool, user_id, TransactionKind::Convert).await, 1);
}

#[tokio::test]
async fn test_convert_rounds_brl_credit() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "rounding").await;

    let result = ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(user_id, dec!(0.00000013)), &context(user_id))
        .await
        .unwrap();

    // 0.000000026 rounded to 8 places
    assert_eq!(result.brl_balance, dec!(0.00000003));
}

#[tokio::test]
async fn test_convert_insufficient_funds_leaves_balances() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "overdraw").await;

    let result = ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(user_id, dec!(5001)), &context(user_id))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InsufficientFunds { .. }))
    ));
    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(5000));
    assert_eq!(balance(&pool, user_id, BRL).await, Decimal::ZERO);
    assert_eq!(ledger_rows(&pool, user_id, TransactionKind::Convert).await, 0);
}

#[tokio::test]
async fn test_convert_rejects_non_positive_amount() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "zero").await;

    for amount in [Decimal::ZERO, dec!(-5)] {
        let result = ConvertHandler::new(pool.clone())
            .execute(ConvertCommand::new(user_id, amount), &context(user_id))
            .await;
        assert!(matches!(result, Err(AppError::Domain(DomainError::InvalidAmount(_)))));
    }

    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(5000));
}

#[tokio::test]
async fn test_convert_without_brl_wallet_rolls_back() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "nobrl").await;

    sqlx::query(
        "DELETE FROM wallets w USING coins c \
         WHERE w.coin_id = c.id AND w.user_id = $1 AND c.symbol = $2",
    )
    .bind(user_id)
    .bind(BRL)
    .execute(&pool)
    .await
    .unwrap();

    let result = ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(user_id, dec!(50)), &context(user_id))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::WalletNotFound { ref symbol })) if symbol == BRL
    ));
    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(5000));
    assert_eq!(ledger_rows(&pool, user_id, TransactionKind::Convert).await, 0);
}

// =========================================================================
// Transfer
// =========================================================================

#[tokio::test]
async fn test_transfer_moves_balance_and_writes_two_rows() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (alice, _) = register_user(&pool, "alice").await;
    let (bob, bob_email) = register_user(&pool, "bob").await;

    ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(alice, dec!(50)), &context(alice))
        .await
        .unwrap();

    let result = TransferHandler::new(pool.clone())
        .execute(TransferCommand::new(alice, &bob_email, "BRL", dec!(4)), &context(alice))
        .await
        .unwrap();

    assert_eq!(result.new_balance, dec!(6));
    assert_eq!(result.recipient_id, bob);
    assert_eq!(result.transaction.user_id, alice);
    assert_eq!(result.transaction.amount_from, dec!(4));
    assert_eq!(result.transaction.amount_to, Decimal::ZERO);

    assert_eq!(balance(&pool, alice, BRL).await, dec!(6));
    assert_eq!(balance(&pool, bob, BRL).await, dec!(4));

    assert_eq!(ledger_rows(&pool, alice, TransactionKind::Transfer).await, 1);
    assert_eq!(ledger_rows(&pool, bob, TransactionKind::Transfer).await, 1);

    let bob_rows = transactions::list_for_user(&pool, bob).await.unwrap();
    let row = &bob_rows[0].transaction;
    assert_eq!(row.user_from_id, alice);
    assert_eq!(row.user_to_id, bob);
    assert_eq!(row.amount_from, Decimal::ZERO);
    assert_eq!(row.amount_to, dec!(4));
}

#[tokio::test]
async fn test_self_transfer_writes_nothing() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, email) = register_user(&pool, "self").await;

    let result = TransferHandler::new(pool.clone())
        .execute(TransferCommand::new(user_id, &email, "OPCOIN", dec!(10)), &context(user_id))
        .await;

    assert!(matches!(result, Err(AppError::Domain(DomainError::SelfTransfer))));
    assert_eq!(balance(&pool, user_id, OPCOIN).await, dec!(5000));
    assert_eq!(ledger_rows(&pool, user_id, TransactionKind::Transfer).await, 0);
}

#[tokio::test]
async fn test_transfer_insufficient_funds_no_partial_writes() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (alice, _) = register_user(&pool, "poor").await;
    let (bob, bob_email) = register_user(&pool, "rich").await;

    let result = TransferHandler::new(pool.clone())
        .execute(TransferCommand::new(alice, &bob_email, "OPCOIN", dec!(5000.5)), &context(alice))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InsufficientFunds { .. }))
    ));
    assert_eq!(balance(&pool, alice, OPCOIN).await, dec!(5000));
    assert_eq!(balance(&pool, bob, OPCOIN).await, dec!(5000));
    assert_eq!(ledger_rows(&pool, alice, TransactionKind::Transfer).await, 0);
    assert_eq!(ledger_rows(&pool, bob, TransactionKind::Transfer).await, 0);
}

#[tokio::test]
async fn test_concurrent_opposite_transfers_keep_total() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (alice, alice_email) = register_user(&pool, "ping").await;
    let (bob, bob_email) = register_user(&pool, "pong").await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let pool = pool.clone();
        let (from, to) = if i % 2 == 0 {
            (alice, bob_email.clone())
        } else {
            (bob, alice_email.clone())
        };
        tasks.push(tokio::spawn(async move {
            TransferHandler::new(pool)
                .execute(TransferCommand::new(from, &to, "OPCOIN", dec!(7)), &context(from))
                .await
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Ten transfers each way cancel out
    assert_eq!(balance(&pool, alice, OPCOIN).await, dec!(5000));
    assert_eq!(balance(&pool, bob, OPCOIN).await, dec!(5000));
    assert_eq!(ledger_rows(&pool, alice, TransactionKind::Transfer).await, 20);
}

// =========================================================================
// Audit trail
// =========================================================================

#[tokio::test]
async fn test_audit_entries_recorded() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (user_id, _) = register_user(&pool, "audited").await;

    ConvertHandler::new(pool.clone())
        .execute(ConvertCommand::new(user_id, dec!(5)), &context(user_id))
        .await
        .unwrap();

    let audit = AuditLogService::new(pool.clone());
    let entries = audit.get_by_user(user_id, 10).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();

    assert_eq!(actions, vec!["wallet.converted", "user.registered"]);
    assert!(entries[0].correlation_id.is_some());
}

#[tokio::test]
async fn test_audit_hash_chain_verifies() {
    let Some(pool) = common::setup_test_db().await else { return };
    register_user(&pool, "chain").await;

    let result = AuditLogService::new(pool.clone())
        .verify_hash_chain(Some(10_000))
        .await
        .unwrap();

    assert!(result.is_valid, "chain broken at {:?}", result.first_invalid_entry);
    assert!(result.entries_checked >= 1);
}
