//! OPCOIN → BRL conversion
//!
//! Fixed rate of 5 OPCOIN per 1 BRL. The BRL side is rounded half-to-even
//! at `MAX_SCALE` decimal places so balances stay exact across repeated
//! conversions.

use rust_decimal::{Decimal, RoundingStrategy};

use super::amount::MAX_SCALE;
use super::{Amount, DomainError};

/// OPCOIN units exchanged for one BRL
pub const OPCOIN_PER_BRL: u32 = 5;

/// Outcome of pricing a conversion, before any wallet is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionQuote {
    /// OPCOIN debited from the user
    pub op_coins: Amount,
    /// BRL credited to the user
    pub brl: Amount,
}

/// Price a conversion of `op_coins` OPCOIN into BRL
pub fn quote(op_coins: Amount) -> Result<ConversionQuote, DomainError> {
    let brl = (op_coins.value() / Decimal::from(OPCOIN_PER_BRL))
        .round_dp_with_strategy(MAX_SCALE, RoundingStrategy::MidpointNearestEven);

    if brl.is_zero() {
        return Err(DomainError::InvalidAmount(format!(
            "{} OPCOIN is below the smallest convertible amount",
            op_coins
        )));
    }

    let brl = Amount::new(brl)?;
    Ok(ConversionQuote { op_coins, brl })
}
