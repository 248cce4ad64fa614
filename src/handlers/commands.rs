//! Command definitions
//!
//! Commands represent intentions to change the system state.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{normalize_email, normalize_symbol};
use crate::domain::InvestorProfile;
use crate::error::AppError;
use crate::store::TransactionRecord;

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

// =========================================================================
// RegisterCommand / LoginCommand
// =========================================================================

/// Command to register a new user
#[derive(Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterCommand {
    /// Build a command with the email normalized
    pub fn new(email: &str, password: String, name: &str) -> Self {
        Self {
            email: normalize_email(email),
            password,
            name: name.trim().to_string(),
        }
    }

    /// Reject blank names, malformed emails and short passwords
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() {
            return Err(AppError::InvalidRequest("name must not be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(AppError::InvalidRequest("email is not valid".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidRequest(format!(
                "password must have at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Command to log in with email and password
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: &str, password: String) -> Self {
        Self {
            email: normalize_email(email),
            password,
        }
    }
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Issued token plus public user fields
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub access_token: String,
}

// =========================================================================
// ConvertCommand
// =========================================================================

/// Command to convert OPCOIN into BRL within one user's wallets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertCommand {
    pub user_id: Uuid,
    /// OPCOIN to debit
    pub op_coins: Decimal,
}

impl ConvertCommand {
    pub fn new(user_id: Uuid, op_coins: Decimal) -> Self {
        Self { user_id, op_coins }
    }
}

/// Result of a conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    pub op_coin_balance: Decimal,
    pub brl_balance: Decimal,
    pub transaction: TransactionRecord,
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move one coin between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub sender_id: Uuid,
    pub recipient_email: String,
    pub coin_symbol: String,
    pub amount: Decimal,
}

impl TransferCommand {
    pub fn new(sender_id: Uuid, recipient_email: &str, coin_symbol: &str, amount: Decimal) -> Self {
        Self {
            sender_id,
            recipient_email: normalize_email(recipient_email),
            coin_symbol: normalize_symbol(coin_symbol),
            amount,
        }
    }
}

/// Result of a transfer, from the sender's side
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub coin_symbol: String,
    /// Sender-perspective ledger row
    pub transaction: TransactionRecord,
    pub recipient_id: Uuid,
}

// =========================================================================
// Profile commands
// =========================================================================

/// Command to create or replace a user's investor profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetProfileCommand {
    pub user_id: Uuid,
    pub profile: String,
}

impl SetProfileCommand {
    pub fn new(user_id: Uuid, profile: impl Into<String>) -> Self {
        Self {
            user_id,
            profile: profile.into(),
        }
    }

    /// Parse the requested profile value
    pub fn parsed_profile(&self) -> Result<InvestorProfile, AppError> {
        Ok(self.profile.parse::<InvestorProfile>()?)
    }
}
