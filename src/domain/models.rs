//! Reference values shared by the store and the handlers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Symbol of the coin every user starts with
pub const OPCOIN: &str = "OPCOIN";

/// Symbol of the Brazilian real
pub const BRL: &str = "BRL";

/// Kinds of ledger transactions, matching the seeded `transaction_types`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Convert,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Convert => "CONVERT",
            TransactionKind::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investor risk profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestorProfile {
    Conservative,
    Moderate,
    Success,
}

impl InvestorProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorProfile::Conservative => "CONSERVATIVE",
            InvestorProfile::Moderate => "MODERATE",
            InvestorProfile::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for InvestorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvestorProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONSERVATIVE" => Ok(InvestorProfile::Conservative),
            "MODERATE" => Ok(InvestorProfile::Moderate),
            "SUCCESS" => Ok(InvestorProfile::Success),
            _ => Err(DomainError::InvalidProfile(s.to_string())),
        }
    }
}

/// Canonical form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Canonical form of a coin symbol
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
