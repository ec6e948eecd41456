//! Lenient decoding for backend payloads
//!
//! The backend does not guarantee field presence or field types: numbers may
//! arrive as floats, strings or `null`. Every numeric field read from a remote
//! payload goes through these helpers instead of being trusted as typed.
//!
//! Use them with `#[serde(default, deserialize_with = "...")]` so that a
//! missing field and an unusable field decode the same way.

use rust_decimal::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

// ============================================================================
// Value coercion
// ============================================================================

/// Non-negative integer from a JSON value, `None` if the value is not numeric.
///
/// Floats are rounded half away from zero, negatives clamp to 0 and numeric
/// strings are accepted.
pub fn opt_int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => Some(int_from_number(n)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(int_from_f64),
        _ => None,
    }
}

/// Non-negative integer from a JSON value, 0 when absent or invalid.
pub fn int_from_value(value: &Value) -> i64 {
    opt_int_from_value(value).unwrap_or(0)
}

/// Non-negative decimal percentage, `None` if the value is not numeric.
pub fn opt_percent_from_value(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }?;
    Some(parsed.max(Decimal::ZERO))
}

fn int_from_number(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        i.max(0)
    } else if n.as_u64().is_some() {
        i64::MAX
    } else {
        n.as_f64().map(int_from_f64).unwrap_or(0)
    }
}

fn int_from_f64(v: f64) -> i64 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    // `as` saturates at i64::MAX
    v.round() as i64
}

/// Decode an array of records, skipping elements that fail to decode.
/// A non-array value yields an empty list.
pub fn records<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Serde adapters
// ============================================================================

/// `deserialize_with` adapter: non-negative integer, 0 on anything unusable.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value))
}

/// `deserialize_with` adapter: non-negative integer or `None`.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(opt_int_from_value(&value))
}

/// `deserialize_with` adapter: non-negative percentage or `None`.
pub fn opt_percent<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(opt_percent_from_value(&value))
}

/// `deserialize_with` adapter: booleans, 0/1 numbers and "true"/"false" strings.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// `deserialize_with` adapter: text or `None` (numbers are stringified).
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// `deserialize_with` adapter: text, empty when absent.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_text(deserializer)?.unwrap_or_default())
}

/// `deserialize_with` adapter: array of records, skipping elements that fail
/// to decode. A non-array value decodes as an empty list.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(records(value))
}

/// `deserialize_with` adapter: nested record, `None` when it fails to decode.
pub fn opt_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Serde default for flags that should read as set when the field is absent.
pub fn yes() -> bool {
    true
}
