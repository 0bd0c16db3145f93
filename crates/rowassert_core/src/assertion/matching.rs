//! Row-shape matching over hydrated results.
//!
//! Comparison is loose: a value read back from SQLite is compared to the
//! expectation the way a test author usually means it, so `"1"`, `1`, `1.0`
//! and `true` are interchangeable. `null` equals the empty string and any
//! falsy non-string value.

use crate::error::{HelperError, HelperResult};
use crate::query::HydratedRow;
use serde_json::{Number, Value as JsonValue};

/// Returns whether any row matches every key of `expected`.
///
/// # Errors
/// - [`HelperError::MissingKey`] when an inspected row lacks an expected key.
///   All rows of one result share their columns, so such a shape can never
///   match.
pub fn rows_contain(expected: &HydratedRow, rows: &[HydratedRow]) -> HelperResult<bool> {
    for row in rows {
        if let Some(key) = expected.keys().find(|key| !row.contains_key(*key)) {
            return Err(HelperError::MissingKey { key: key.clone() });
        }

        let matches = expected
            .iter()
            .all(|(key, value)| loosely_equal(&row[key], value));
        if matches {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Renders rows for substring assertions.
pub fn serialize_rows(rows: &[HydratedRow]) -> HelperResult<String> {
    Ok(serde_json::to_string(rows)?)
}

/// Returns whether `text` occurs in the rendering of `rows`.
///
/// The needle is escaped the way string values are escaped in
/// [`serialize_rows`], so quotes, backslashes and control characters in a
/// stored value match the literal text.
pub fn rows_mention(text: &str, rows: &[HydratedRow]) -> HelperResult<bool> {
    let escaped = serde_json::to_string(text)?;
    let needle = &escaped[1..escaped.len() - 1];
    Ok(serialize_rows(rows)?.contains(needle))
}

/// Loose equality between a stored value and an expected value.
pub fn loosely_equal(actual: &JsonValue, expected: &JsonValue) -> bool {
    match (actual, expected) {
        (JsonValue::Null, JsonValue::Null) => true,
        (JsonValue::Null, JsonValue::String(text))
        | (JsonValue::String(text), JsonValue::Null) => text.is_empty(),
        (JsonValue::Null, other) | (other, JsonValue::Null) => !is_truthy(other),
        (JsonValue::Bool(flag), other) | (other, JsonValue::Bool(flag)) => *flag == is_truthy(other),
        (JsonValue::Number(left), JsonValue::Number(right)) => numbers_equal(left, right),
        (JsonValue::Number(number), JsonValue::String(text))
        | (JsonValue::String(text), JsonValue::Number(number)) => {
            match (number.as_i64(), parse_integer(text)) {
                (Some(number), Some(parsed)) => number == parsed,
                _ => match parse_numeric(text) {
                    Some(parsed) => number.as_f64() == Some(parsed),
                    None => number.to_string() == *text,
                },
            }
        }
        (JsonValue::String(left), JsonValue::String(right)) => {
            if let (Some(left), Some(right)) = (parse_integer(left), parse_integer(right)) {
                return left == right;
            }
            match (parse_numeric(left), parse_numeric(right)) {
                (Some(left), Some(right)) => left == right,
                _ => left == right,
            }
        }
        (JsonValue::Array(left), JsonValue::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(left, right)| loosely_equal(left, right))
        }
        (JsonValue::Object(left), JsonValue::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right
                        .get(key)
                        .is_some_and(|other| loosely_equal(value, other))
                })
        }
        _ => false,
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(text) => !text.is_empty() && text != "0",
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
    }
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    match (left.as_i64(), right.as_i64()) {
        (Some(left), Some(right)) => left == right,
        _ => left.as_f64() == right.as_f64(),
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let numeric_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if trimmed.is_empty() || !numeric_chars || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
