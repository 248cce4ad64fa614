//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain-specific errors
///
/// Every message is safe to show to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Registration with an email that already exists
    #[error("Email {0} is already in use")]
    EmailTaken(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Transfer recipient not found
    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    /// Coin symbol not seeded
    #[error("Coin not found: {0}")]
    CoinNotFound(String),

    /// User holds no wallet for the coin
    #[error("Wallet not found for coin {symbol}")]
    WalletNotFound { symbol: String },

    /// Transaction type not seeded
    #[error("Transaction type not found: {0}")]
    TransactionTypeNotFound(String),

    /// Balance does not cover the requested amount
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    /// Sender and recipient are the same user
    #[error("Cannot transfer to yourself")]
    SelfTransfer,

    /// Invalid amount (zero, negative, too precise or too large)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Unknown investor profile value
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// User has no investor profile
    #[error("Profile not found")]
    ProfileNotFound,

    /// User already has an investor profile
    #[error("Profile already exists")]
    ProfileAlreadyExists,
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Create a wallet not found error
    pub fn wallet_not_found(symbol: impl Into<String>) -> Self {
        Self::WalletNotFound {
            symbol: symbol.into(),
        }
    }
}
