//! Transfer Handler
//!
//! Moves one coin between two users. Each participant gets a ledger row
//! written from their own side of the transfer.

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use crate::audit::{AuditAction, AuditLogBuilder, AuditLogService};
use crate::domain::{Amount, Balance, DomainError, OperationContext, TransactionKind};
use crate::error::AppError;
use crate::store::{coins, transactions, users, wallets, NewTransaction};

use super::{TransferCommand, TransferResult};

/// Handler for user-to-user transfers
pub struct TransferHandler {
    pool: PgPool,
    audit: AuditLogService,
}

impl TransferHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            audit: AuditLogService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, AppError> {
        let amount = Amount::new(command.amount).map_err(DomainError::from)?;
        let sender_id = command.sender_id;

        let mut tx = self.pool.begin().await?;

        let coin = coins::find_by_symbol(&mut *tx, &command.coin_symbol)
            .await?
            .ok_or_else(|| DomainError::CoinNotFound(command.coin_symbol.clone()))?;

        let recipient = users::find_by_email(&mut *tx, &command.recipient_email)
            .await?
            .ok_or_else(|| DomainError::RecipientNotFound(command.recipient_email.clone()))?;

        if recipient.id == sender_id {
            return Err(DomainError::SelfTransfer.into());
        }

        let type_id = transactions::find_type_id(&mut *tx, TransactionKind::Transfer)
            .await?
            .ok_or_else(|| DomainError::TransactionTypeNotFound(TransactionKind::Transfer.to_string()))?;

        let locked = wallets::lock_for_users_coin(&mut *tx, &[sender_id, recipient.id], coin.id).await?;
        let sender_wallet = locked
            .iter()
            .find(|w| w.user_id == sender_id)
            .ok_or_else(|| DomainError::wallet_not_found(&coin.symbol))?;
        let recipient_wallet = locked
            .iter()
            .find(|w| w.user_id == recipient.id)
            .ok_or_else(|| DomainError::wallet_not_found(&coin.symbol))?;

        let sender_balance = Balance::new(sender_wallet.balance).debit(&amount)?;
        let recipient_balance = Balance::new(recipient_wallet.balance).credit(&amount);

        let sender_wallet = wallets::set_balance(&mut *tx, sender_wallet.id, sender_balance.value()).await?;
        wallets::set_balance(&mut *tx, recipient_wallet.id, recipient_balance.value()).await?;

        let transfer_row = |user_id, amount_from, amount_to| NewTransaction {
            type_id,
            from_coin_id: coin.id,
            to_coin_id: coin.id,
            amount_from,
            amount_to,
            user_id,
            user_from_id: sender_id,
            user_to_id: recipient.id,
        };

        transactions::insert(&mut *tx, &transfer_row(recipient.id, Decimal::ZERO, amount.value())).await?;
        let transaction =
            transactions::insert(&mut *tx, &transfer_row(sender_id, amount.value(), Decimal::ZERO)).await?;

        tx.commit().await?;

        tracing::info!(
            sender_id = %sender_id,
            recipient_id = %recipient.id,
            transaction_id = %transaction.id,
            coin = %coin.symbol,
            amount = %amount,
            "Transfer completed"
        );

        self.audit
            .record(
                AuditLogBuilder::new(AuditAction::TransferExecuted)
                    .resource_type("Transaction")
                    .resource_id(transaction.id)
                    .details(&json!({
                        "recipient_id": recipient.id,
                        "coin": coin.symbol,
                        "amount": amount.value(),
                    })),
                context,
            )
            .await;

        Ok(TransferResult {
            new_balance: sender_wallet.balance,
            amount: amount.value(),
            coin_symbol: coin.symbol,
            transaction,
            recipient_id: recipient.id,
        })
    }
}
