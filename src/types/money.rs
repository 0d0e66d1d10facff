//! Monetary amount validation
//!
//! All balances and amounts are fixed-point decimals with two fractional
//! digits. Amounts entering the ledger are checked here before any account
//! state is touched.

use super::error::LedgerError;
use rust_decimal::Decimal;

/// Number of fractional digits carried by every amount and balance
pub const MONEY_SCALE: u32 = 2;

/// Validate a transaction amount and bring it to scale 2
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is zero, negative, carries
/// significant digits beyond the second decimal place, or is too large to be
/// held with two decimal places.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, "must be greater than zero"));
    }

    let normalized = amount.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(LedgerError::invalid_amount(
            amount,
            "must have at most 2 decimal places",
        ));
    }

    let mut scaled = normalized;
    scaled.rescale(MONEY_SCALE);
    if scaled.scale() != MONEY_SCALE {
        return Err(LedgerError::invalid_amount(
            amount,
            "exceeds the supported range",
        ));
    }
    Ok(scaled)
}
