use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single typed cell of a parsed record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Value {
    /// A timestamp. The parser lifts a record's temporal column into
    /// `Record::time`, so this variant only appears in values built by callers.
    Temporal(NaiveDateTime),
    Number(Decimal),
    Text(String),
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(Decimal::ZERO)
    }
}

impl Value {
    /// Coerces a raw non-temporal token: numeric when it parses, text otherwise.
    pub fn from_token(raw: &str) -> Self {
        match parse_decimal(raw) {
            Some(number) => Value::Number(number),
            None => Value::Text(raw.to_string()),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Temporal(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Number(number) => number.normalize().to_string(),
            Value::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Parses a decimal token using an invariant `.` separator.
///
/// Surrounding whitespace, a leading sign and exponent notation (`1.493e-05`)
/// are accepted. Thousands separators and underscores are not. Digits past the
/// 28th decimal place are rounded away; values beyond the decimal range are
/// rejected.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(['_', ',']) {
        return None;
    }
    match trimmed.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => parse_scientific(mantissa, exponent),
        None => Decimal::from_str(trimmed).ok(),
    }
}

/// Exponents whose magnitude passes this bound are all zero or all out of range.
const MAX_EXPONENT: i64 = 64;

/// Shifts the decimal point of `mantissa` by `exponent` places and parses the
/// plain form, so excess fractional digits round instead of failing.
fn parse_scientific(mantissa: &str, exponent: &str) -> Option<Decimal> {
    let exponent = exponent.parse::<i64>().ok()?;
    let (negative, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = format!("{int_part}{frac_part}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if exponent < -MAX_EXPONENT {
        return Some(Decimal::ZERO);
    }
    if exponent > MAX_EXPONENT {
        return None;
    }

    let point = int_part.len() as i64 + exponent;
    let plain = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    };
    let value = Decimal::from_str(&plain).ok()?;
    Some(if negative { -value } else { value })
}

/// Header tokens become field names by trimming and lower-casing.
pub fn normalize_field_name(token: &str) -> String {
    token.trim().to_lowercase()
}
