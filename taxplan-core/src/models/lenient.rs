//! Serde helpers that resolve absent or malformed upstream values once, at
//! the deserialisation boundary.
//!
//! Client records arrive assembled from several collaborator documents and
//! AI responses, so a monetary leaf may be missing, `null`, an empty string,
//! a number or a numeric string. All of those collapse to a [`Decimal`]
//! here, with "absent" meaning zero. Amounts are clamped to
//! `0..=MAX_AMOUNT` so downstream arithmetic cannot overflow.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Largest amount accepted from input: one quadrillion rupees.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Deserializes a monetary amount, treating absent, `null`, empty and
/// unparseable values as zero.
pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(decimal_from_value)
        .map(clamp_amount)
        .unwrap_or(Decimal::ZERO))
}

/// Deserializes an optional amount; `None` only when the value is absent,
/// `null` or unparseable.
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value).map(clamp_amount))
}

/// Negative amounts become zero; anything above [`MAX_AMOUNT`] saturates.
pub fn clamp_amount(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_AMOUNT)
}

/// Deserializes a non-negative count, defaulting to zero.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Deserializes an optional date from either `YYYY-MM-DD` or an ISO-8601
/// timestamp (only the date part is kept). Non-string values are `None`.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Deserializes a string-backed enum through its `FromStr`, falling back to
/// `Default` for anything it does not recognise.
pub fn enumeration<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => T::default(),
    })
}

/// Deserializes free text, turning `null` into an empty string.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Deserializes a list of steps; a bare string becomes a one-item list and
/// `null` an empty one.
pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// Parses the date part of an ISO date or timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Converts a JSON scalar into a [`Decimal`].
///
/// Strings may carry thousands separators or a leading rupee sign.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => {
            let normalized: String = s
                .trim()
                .trim_start_matches('₹')
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if normalized.is_empty() {
                None
            } else {
                normalized.parse().ok()
            }
        }
        _ => None,
    }
}
