//! Amount and Balance types
//!
//! Domain primitives for monetary values. Amounts are validated at
//! construction time, so an invalid amount never reaches the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// Maximum allowed amount per operation (1 trillion units)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum decimal places, matching the NUMERIC(30, 8) columns
pub const MAX_SCALE: u32 = 8;

/// Amount represents a validated, strictly positive monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 8 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use bankop::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(50, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(50, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 significant decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        // JSON numbers such as 10.50 arrive with trailing zeros; only the
        // significant digits count against the scale limit.
        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > Decimal::from(MAX_AMOUNT) {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        DomainError::InvalidAmount(err.to_string())
    }
}

/// Balance of a wallet.
///
/// The schema allows any signed value; sufficiency is enforced here, in
/// `debit`, which is the only way the ledger lowers a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(Decimal);

impl Balance {
    /// Wrap a stored balance
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if balance covers the amount
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Balance {
        Balance(self.0 + amount.value())
    }

    /// Subtract amount from balance, failing when it does not cover the amount
    pub fn debit(&self, amount: &Amount) -> Result<Balance, DomainError> {
        if !self.is_sufficient_for(amount) {
            return Err(DomainError::insufficient_funds(amount.value(), self.0));
        }
        Ok(Balance(self.0 - amount.value()))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Balance {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100));
        assert_eq!(amount.unwrap().value(), dec!(100));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-100));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        let amount = Amount::new(dec!(0.123456789));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(9))));
    }

    #[test]
    fn test_amount_trailing_zeros_ignored() {
        let amount = Amount::new(dec!(10.5000000000)).unwrap();
        assert_eq!(amount.value(), dec!(10.5));
    }

    #[test]
    fn test_amount_max_decimals_ok() {
        assert!(Amount::new(dec!(0.12345678)).is_ok());
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000000001));
        assert!(matches!(amount, Err(AmountError::Overflow)));
        assert!(Amount::new(dec!(1000000000000)).is_ok());
    }

    #[test]
    fn test_amount_deserializes_from_json_number() {
        let amount: Amount = serde_json::from_str("50").unwrap();
        assert_eq!(amount.value(), dec!(50));

        let rejected: Result<Amount, _> = serde_json::from_str("-1");
        assert!(rejected.is_err());
    }

    #[test]
    fn test_balance_credit_debit() {
        let balance = Balance::zero();
        let balance = balance.credit(&Amount::new(dec!(100)).unwrap());
        assert_eq!(balance.value(), dec!(100));

        let balance = balance.debit(&Amount::new(dec!(30)).unwrap()).unwrap();
        assert_eq!(balance.value(), dec!(70));
    }

    #[test]
    fn test_balance_debit_exact_amount() {
        let balance = Balance::new(dec!(5000));
        let balance = balance.debit(&Amount::new(dec!(5000)).unwrap()).unwrap();
        assert_eq!(balance.value(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(dec!(50));
        let amount = Amount::new(dec!(100)).unwrap();

        assert!(!balance.is_sufficient_for(&amount));
        assert_eq!(
            balance.debit(&amount),
            Err(DomainError::insufficient_funds(dec!(100), dec!(50)))
        );
    }
}
