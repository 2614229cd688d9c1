//! Conversion between human-readable token amounts and on-chain base units.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Decimals of every chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("invalid amount: {0:?}")]
    Invalid(String),
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount {amount} has more than {decimals} decimal places")]
    TooPrecise { amount: Decimal, decimals: u8 },
    #[error("amount {0} is too large")]
    Overflow(Decimal),
}

/// Parse a user-supplied decimal string. The result is normalized and
/// strictly positive.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    let amount = Decimal::from_str_exact(trimmed)
        .map_err(|_| AmountError::Invalid(input.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    Ok(amount.normalize())
}

/// Scale `amount` by `10^decimals`. Never truncates: an amount with more
/// fractional digits than the token supports is an error.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.normalize();
    if amount.is_sign_negative() {
        return Err(AmountError::NotPositive);
    }
    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(AmountError::TooPrecise { amount, decimals });
    }
    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let factor = U256::from(10u8)
        .checked_pow(U256::from(u32::from(decimals) - scale))
        .ok_or(AmountError::Overflow(amount))?;
    mantissa
        .checked_mul(factor)
        .ok_or(AmountError::Overflow(amount))
}

/// Render base units as a decimal string with trailing zeros trimmed.
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}
