//! Ringgit display and parsing helpers.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_half_up;

/// Error returned when a string cannot be read as a ringgit amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// Formats `amount` as `RM 1,234.56`. Negative amounts get a leading `-`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use relief_core::format::format_currency;
///
/// assert_eq!(format_currency(dec!(1234.565)), "RM 1,234.57");
/// assert_eq!(format_currency(dec!(-50)), "-RM 50.00");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{sign}RM {}.{fraction}", group_thousands(whole))
}

/// Formats a percentage value, e.g. `12.5` as `12.50%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round_half_up(value))
}

/// Parses user or CSV input such as `RM 1,234.50` into a [`Decimal`].
///
/// The `RM` prefix is optional and case-insensitive; commas are treated as
/// thousands separators.
pub fn parse_amount(input: &str) -> Result<Decimal, ParseAmountError> {
    let trimmed = input.trim();
    let unprefixed = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("rm") => &trimmed[2..],
        _ => trimmed,
    };
    let normalized = unprefixed.trim().replace(',', "");

    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized
        .parse()
        .map_err(|e: rust_decimal::Error| ParseAmountError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
