//! Convert Handler
//!
//! Converts OPCOIN into BRL at the fixed rate, inside one transaction.

use serde_json::json;
use sqlx::PgPool;

use crate::audit::{AuditAction, AuditLogBuilder, AuditLogService};
use crate::domain::{quote, Amount, Balance, DomainError, OperationContext, TransactionKind, BRL, OPCOIN};
use crate::error::AppError;
use crate::store::{coins, transactions, wallets, NewTransaction};

use super::{ConvertCommand, ConvertResult};

/// Handler for OPCOIN → BRL conversions
pub struct ConvertHandler {
    pool: PgPool,
    audit: AuditLogService,
}

impl ConvertHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            audit: AuditLogService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the convert command
    pub async fn execute(
        &self,
        command: ConvertCommand,
        context: &OperationContext,
    ) -> Result<ConvertResult, AppError> {
        let amount = Amount::new(command.op_coins).map_err(DomainError::from)?;
        let quote = quote(amount)?;

        let mut tx = self.pool.begin().await?;

        let op_coin = coins::find_by_symbol(&mut *tx, OPCOIN)
            .await?
            .ok_or_else(|| DomainError::CoinNotFound(OPCOIN.to_string()))?;
        let brl = coins::find_by_symbol(&mut *tx, BRL)
            .await?
            .ok_or_else(|| DomainError::CoinNotFound(BRL.to_string()))?;

        let type_id = transactions::find_type_id(&mut *tx, TransactionKind::Convert)
            .await?
            .ok_or_else(|| DomainError::TransactionTypeNotFound(TransactionKind::Convert.to_string()))?;

        let locked =
            wallets::lock_for_user_coins(&mut *tx, command.user_id, &[op_coin.id, brl.id]).await?;
        let op_wallet = locked
            .iter()
            .find(|w| w.coin_id == op_coin.id)
            .ok_or_else(|| DomainError::wallet_not_found(OPCOIN))?;
        let brl_wallet = locked
            .iter()
            .find(|w| w.coin_id == brl.id)
            .ok_or_else(|| DomainError::wallet_not_found(BRL))?;

        let op_balance = Balance::new(op_wallet.balance).debit(&quote.op_coins)?;
        let brl_balance = Balance::new(brl_wallet.balance).credit(&quote.brl);

        let op_wallet = wallets::set_balance(&mut *tx, op_wallet.id, op_balance.value()).await?;
        let brl_wallet = wallets::set_balance(&mut *tx, brl_wallet.id, brl_balance.value()).await?;

        let transaction = transactions::insert(
            &mut *tx,
            &NewTransaction {
                type_id,
                from_coin_id: op_coin.id,
                to_coin_id: brl.id,
                amount_from: quote.op_coins.value(),
                amount_to: quote.brl.value(),
                user_id: command.user_id,
                user_from_id: command.user_id,
                user_to_id: command.user_id,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %command.user_id,
            transaction_id = %transaction.id,
            op_coins = %quote.op_coins,
            brl = %quote.brl,
            "Coins converted"
        );

        self.audit
            .record(
                AuditLogBuilder::new(AuditAction::CoinsConverted)
                    .resource_type("Transaction")
                    .resource_id(transaction.id)
                    .details(&json!({
                        "op_coins": quote.op_coins.value(),
                        "brl": quote.brl.value(),
                    })),
                context,
            )
            .await;

        Ok(ConvertResult {
            op_coin_balance: op_wallet.balance,
            brl_balance: brl_wallet.balance,
            transaction,
        })
    }
}
