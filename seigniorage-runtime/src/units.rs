//! Exact conversion between human-readable decimal amounts and on-chain
//! base units.
//!
//! Conversions never round: an input with more fractional digits than the
//! token's decimal count is rejected instead of truncated.

use alloy::primitives::U256;

use crate::error::ProtocolError;

/// Largest decimal count whose scale factor fits in a U256.
pub const MAX_DECIMALS: u8 = 77;

/// `10^decimals`, or `None` past [`MAX_DECIMALS`].
fn scale(decimals: u8) -> Option<U256> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    U256::from(10u64).checked_pow(U256::from(decimals))
}

fn unsupported(decimals: u8) -> ProtocolError {
    ProtocolError::MalformedValue(format!(
        "unsupported decimal count {decimals} (max {MAX_DECIMALS})"
    ))
}

/// Reject decimal counts whose scale factor does not fit in a U256.
pub fn check_decimals(decimals: u8) -> Result<(), ProtocolError> {
    scale(decimals).map(|_| ()).ok_or_else(|| unsupported(decimals))
}

fn invalid(amount: &str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::InvalidAmount {
        amount: amount.to_string(),
        reason: reason.into(),
    }
}

/// Parse a decimal string such as `"1.45"` into base units for a token
/// with `decimals` fractional digits.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ProtocolError> {
    if scale(decimals).is_none() {
        return Err(invalid(amount, format!("unsupported decimal count {decimals}")));
    }
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(invalid(amount, "empty amount"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid(amount, "negative amounts are not allowed"));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(amount, "no digits"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid(amount, "expected decimal digits"));
    }
    if fraction.len() > decimals as usize {
        return Err(invalid(
            amount,
            format!("more than {decimals} fractional digits"),
        ));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let digits = format!("{whole}{padded}");

    U256::from_str_radix(&digits, 10).map_err(|e| invalid(amount, e.to_string()))
}

/// Render base units as a decimal string with trailing zeros removed.
///
/// `format_units(1_450_000, 6) == "1.45"`, `format_units(0, 18) == "0"`.
pub fn format_units(value: U256, decimals: u8) -> Result<String, ProtocolError> {
    let unit = scale(decimals).ok_or_else(|| unsupported(decimals))?;
    let whole = value / unit;
    let fraction = value % unit;
    if fraction.is_zero() {
        return Ok(whole.to_string());
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    Ok(format!("{whole}.{}", fraction.trim_end_matches('0')))
}

/// Render base units truncated to `fraction_digits` places, the way balances
/// are shown on a dashboard.
pub fn display_balance(value: U256, decimals: u8, fraction_digits: u8) -> Result<String, ProtocolError> {
    check_decimals(decimals)?;
    let shown = fraction_digits.min(decimals);
    let hidden = scale(decimals - shown).ok_or_else(|| unsupported(decimals))?;
    let truncated = value / hidden;
    if shown == 0 {
        return Ok(truncated.to_string());
    }
    let unit = scale(shown).ok_or_else(|| unsupported(decimals))?;
    Ok(format!(
        "{}.{:0>width$}",
        truncated / unit,
        (truncated % unit).to_string(),
        width = shown as usize
    ))
}
