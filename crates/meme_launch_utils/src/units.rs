use ethers::types::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

const MAX_DECIMAL_SCALE: u32 = 28;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("negative amount {0}")]
    Negative(Decimal),
    #[error("amount overflows base units")]
    Overflow,
    #[error("{decimals} decimals not supported")]
    UnsupportedDecimals { decimals: u32 },
}

/// Convert a display amount to base units, truncating digits beyond `decimals`.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, UnitsError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(UnitsError::Negative(amount));
    }
    let truncated =
        amount.round_dp_with_strategy(decimals.min(MAX_DECIMAL_SCALE), RoundingStrategy::ToZero);
    let mantissa =
        u128::try_from(truncated.mantissa()).map_err(|_| UnitsError::Negative(amount))?;
    let factor = U256::exp10((decimals - truncated.scale()) as usize);
    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(UnitsError::Overflow)
}

/// Exact inverse of [`to_base_units`] for values that fit a 96-bit mantissa.
pub fn from_base_units(amount: U256, decimals: u32) -> Result<Decimal, UnitsError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(UnitsError::UnsupportedDecimals { decimals });
    }
    if amount > U256::from(i128::MAX as u128) {
        return Err(UnitsError::Overflow);
    }
    Decimal::try_from_i128_with_scale(amount.as_u128() as i128, decimals)
        .map(|value| value.normalize())
        .map_err(|_| UnitsError::Overflow)
}
