//! # Lenient Numeric Coercion
//!
//! Console payloads are loosely shaped: totals arrive as numbers, numeric
//! strings, `null`, or not at all. Pricing screens must keep rendering, so
//! every numeric read goes through this module and anything that is not a
//! finite number becomes zero.
//!
//! ## Coercion Table
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │  JSON value                  │  Result                      │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │  42, 12.5, 1e3               │  exact decimal               │
//! │  "12.50", "  7 ", "2.5e2"    │  exact decimal (trimmed)     │
//! │  "", "abc", "NaN"            │  not numeric → 0             │
//! │  null, true, [], {}          │  not numeric → 0             │
//! │  1e300 (beyond 96-bit range) │  not numeric → 0             │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

/// Converts a JSON value to a finite decimal, if it is numeric.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_numeric(&n.to_string()),
        Value::String(s) => parse_numeric(s.trim()),
        _ => None,
    }
}

/// Converts a JSON value to a decimal, degrading to zero.
pub fn decimal_or_zero(value: &Value) -> Decimal {
    coerce_decimal(value).unwrap_or_else(|| {
        if !value.is_null() {
            trace!(?value, "Non-numeric value coerced to zero");
        }
        Decimal::ZERO
    })
}

/// Converts a JSON value to a unit count.
///
/// Only positive values count; fractions are truncated toward zero.
pub fn count_or_zero(value: &Value) -> u64 {
    match coerce_decimal(value) {
        Some(n) if n > Decimal::ZERO => n.trunc().to_u64().unwrap_or(0),
        _ => 0,
    }
}

fn parse_numeric(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// =============================================================================
// Serde Adapters
// =============================================================================

/// `deserialize_with` adapter for lenient decimal fields.
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_or_zero(&value))
}

/// `deserialize_with` adapter for lenient count fields.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_or_zero(&value))
}

/// `deserialize_with` adapter for identifiers that may arrive as numbers.
///
/// Strings pass through, numbers are rendered, anything else is absent.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(identifier(value))
}

/// Like [`deserialize_optional_string`], with absent values as `""`.
pub fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(identifier(value).unwrap_or_default())
}

/// `deserialize_with` adapter for date fields.
///
/// `null` is absent. Any other non-string value is kept as its JSON text,
/// which no date format accepts, so the date stays present but unparseable.
pub fn deserialize_date_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// `deserialize_with` adapter for collections.
///
/// `null` or a non-array reads as empty. An element of the wrong shape reads
/// as `T::default()`, so positions are kept for index-paired collections.
pub fn deserialize_vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            trace!(value = ?other, "Non-array collection read as empty");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).unwrap_or_else(|err| {
                trace!(index, error = %err, "Malformed collection element read as default");
                T::default()
            })
        })
        .collect())
}

/// `deserialize_with` adapter for lists of identifiers.
///
/// Entries that are neither strings nor numbers are dropped.
pub fn deserialize_identifiers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(identifier).collect()),
        _ => Ok(Vec::new()),
    }
}

fn identifier(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
