//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod context;
pub mod conversion;
pub mod error;
pub mod models;

pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use conversion::{quote, ConversionQuote, OPCOIN_PER_BRL};
pub use error::DomainError;
pub use models::{InvestorProfile, TransactionKind, BRL, OPCOIN};
