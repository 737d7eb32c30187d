//! Decimal rounding and lenient numeric coercion.
//!
//! Amounts are rounded half away from zero. Request payloads may carry quantities and
//! prices as JSON numbers or as strings typed into a form; anything that does not start
//! with a number silently becomes zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Number of fractional digits kept on every monetary field.
pub const MONEY_SCALE: u32 = 2;

/// Round to paise (2 decimal places), half away from zero, with the scale pinned to 2.
pub fn round2(value: Decimal) -> Decimal {
    pin_scale(value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Round to the nearest whole rupee, half away from zero.
///
/// The result still carries two fractional digits (always `.00`) so that it serializes
/// the same way as the other money fields.
pub fn round_to_rupee(value: Decimal) -> Decimal {
    pin_scale(value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

fn pin_scale(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_SCALE);
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    value
}

/// Parse the longest numeric prefix of `input`, returning zero when there is none.
///
/// `"12.5kg"` is 12.5, `" 7"` is 7, `"abc"` and `""` are 0.
pub fn parse_lenient(input: &str) -> Decimal {
    let trimmed = input.trim_start();
    let end = numeric_prefix_len(trimmed);
    parse_decimal(&trimmed[..end]).unwrap_or(Decimal::ZERO)
}

/// Coerce a JSON value (number or string) into a decimal. Other JSON types become zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_lenient(&n.to_string()),
        Value::String(s) => parse_lenient(s),
        _ => Decimal::ZERO,
    }
}

/// Parse a JSON value that must be entirely numeric.
///
/// Used by request validation, where `"12abc"` is rejected instead of degraded.
pub fn parse_strict(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() || numeric_prefix_len(&text) != text.len() {
        return None;
    }
    parse_decimal(&text)
}

fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let unsigned = unsigned.strip_suffix('.').unwrap_or(unsigned);
    let mut normalized = String::with_capacity(unsigned.len() + 2);
    if negative {
        normalized.push('-');
    }
    if unsigned.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(unsigned);

    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()
    } else {
        Decimal::from_str(&normalized).ok()
    }
}
