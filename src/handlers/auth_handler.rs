//! Auth Handlers
//!
//! Registration and login. Registration creates the user and both default
//! wallets in one transaction.

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use crate::audit::{AuditAction, AuditLogBuilder, AuditLogService};
use crate::auth::password::{
    hash_password_blocking, verify_dummy_blocking, verify_password_blocking,
};
use crate::auth::TokenService;
use crate::domain::{DomainError, OperationContext, BRL, OPCOIN};
use crate::error::AppError;
use crate::store::{coins, users, wallets, UserRecord};

use super::{AuthResult, LoginCommand, RegisterCommand};

/// Opening OPCOIN balance of every new user
pub const INITIAL_OPCOIN_BALANCE: i64 = 5000;

// =========================================================================
// RegisterHandler
// =========================================================================

/// Handler for user registration
pub struct RegisterHandler {
    pool: PgPool,
    tokens: TokenService,
    audit: AuditLogService,
}

impl RegisterHandler {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            audit: AuditLogService::new(pool.clone()),
            pool,
            tokens,
        }
    }

    /// Execute the register command
    pub async fn execute(
        &self,
        command: RegisterCommand,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        command.validate()?;

        // Hash outside the transaction so no connection is held during it
        let password_hash = hash_password_blocking(command.password.clone()).await?;

        let mut tx = self.pool.begin().await?;

        if users::count_by_email(&mut *tx, &command.email).await? > 0 {
            return Err(DomainError::EmailTaken(command.email).into());
        }

        let user = users::insert(&mut *tx, &command.email, &password_hash, &command.name)
            .await
            .map_err(|e| map_unique_violation(e, &command.email))?;

        let op_coin = coins::find_by_symbol(&mut *tx, OPCOIN)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Coin {} is not seeded", OPCOIN)))?;
        let brl = coins::find_by_symbol(&mut *tx, BRL)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Coin {} is not seeded", BRL)))?;

        wallets::insert(&mut *tx, user.id, op_coin.id, Decimal::from(INITIAL_OPCOIN_BALANCE)).await?;
        wallets::insert(&mut *tx, user.id, brl.id, Decimal::ZERO).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "User registered");

        let access_token = self.tokens.issue(user.id)?;

        let audit_context = context.clone().with_request_user(user.id);
        self.audit
            .record(
                AuditLogBuilder::new(AuditAction::UserRegistered)
                    .resource_type("User")
                    .resource_id(user.id)
                    .details(&json!({ "email": user.email })),
                &audit_context,
            )
            .await;

        Ok(auth_result(user, access_token))
    }
}

/// Concurrent registrations with one email surface as a unique violation
fn map_unique_violation(err: sqlx::Error, email: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DomainError::EmailTaken(email.to_string()).into()
        }
        _ => err.into(),
    }
}

// =========================================================================
// LoginHandler
// =========================================================================

/// Handler for email/password login
pub struct LoginHandler {
    pool: PgPool,
    tokens: TokenService,
    audit: AuditLogService,
}

impl LoginHandler {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            audit: AuditLogService::new(pool.clone()),
            pool,
            tokens,
        }
    }

    /// Execute the login command
    pub async fn execute(
        &self,
        command: LoginCommand,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        let user = users::find_by_email(&self.pool, &command.email).await?;

        let user = match user {
            Some(user) => {
                let matches =
                    verify_password_blocking(command.password, user.password_hash.clone()).await?;
                matches.then_some(user)
            }
            None => {
                // Unknown emails pay for one verification as well
                if let Err(e) = verify_dummy_blocking(command.password).await {
                    tracing::warn!(error = %e, "Dummy password verification failed");
                }
                None
            }
        };

        let Some(user) = user else {
            tracing::info!(email = %command.email, "Login rejected");
            self.audit
                .record(
                    AuditLogBuilder::new(AuditAction::LoginFailed)
                        .resource_type("User")
                        .details(&json!({ "email": command.email })),
                    context,
                )
                .await;
            return Err(DomainError::InvalidCredentials.into());
        };

        let access_token = self.tokens.issue(user.id)?;

        tracing::info!(user_id = %user.id, "User logged in");

        let audit_context = context.clone().with_request_user(user.id);
        self.audit
            .record(
                AuditLogBuilder::new(AuditAction::LoginSucceeded)
                    .resource_type("User")
                    .resource_id(user.id),
                &audit_context,
            )
            .await;

        Ok(auth_result(user, access_token))
    }
}

fn auth_result(user: UserRecord, access_token: String) -> AuthResult {
    AuthResult {
        user_id: user.id,
        name: user.name,
        email: user.email,
        access_token,
    }
}
