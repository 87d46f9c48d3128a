//! Value coercions shared by the built-in operators.
//!
//! The `*_operand` helpers apply the configured [`FallbackPolicy`] so every
//! lenient fallback lives in one place.

use crate::config::FallbackPolicy;
use crate::document::{bson_regex, Bson, Regex};
use crate::error::{FilterError, Result};
use crate::ir::Leaf;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`.
const ZERO_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// Strictly parse boolean text. Accepts `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Permissive boolean coercion: unrecognized text yields `default`.
pub fn string_to_bool(text: &str, default: bool) -> bool {
    parse_bool(text).unwrap_or(default)
}

/// Parse an RFC 3339 timestamp and normalize it to UTC.
pub fn parse_rfc3339(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}

/// The timestamp substituted for unparsable dates: `0001-01-01T00:00:00Z`.
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIMESTAMP_SECS, 0).unwrap_or_default()
}

/// Unanchored literal-substring pattern.
pub fn regex_contains(text: &str, ignore_case: bool) -> Regex {
    let escaped = regex::escape(text);
    if ignore_case {
        bson_regex(escaped.to_lowercase(), "i")
    } else {
        bson_regex(escaped, "")
    }
}

/// Anchored, case-insensitive exact-match pattern.
pub fn regex_exact_ci(text: &str) -> Regex {
    bson_regex(format!("^{}$", regex::escape(text).to_lowercase()), "i")
}

/// The leaf's scalar operand as a timestamp, following `malformed_date`.
pub fn date_operand(leaf: &Leaf, policy: &FallbackPolicy) -> Result<DateTime<Utc>> {
    let text = leaf.value_text();
    match parse_rfc3339(&text) {
        Ok(dt) => Ok(dt),
        Err(err) if policy.malformed_date.is_reject() => Err(FilterError::InvalidDate {
            field: leaf.field.clone(),
            value: text,
            reason: err.to_string(),
        }),
        Err(err) => {
            debug!(field = %leaf.field, value = %text, error = %err, "unparsable date, using zero timestamp");
            Ok(zero_timestamp())
        }
    }
}

/// The leaf's scalar operand as a boolean, following `malformed_bool`.
pub fn bool_operand(leaf: &Leaf, policy: &FallbackPolicy) -> Result<bool> {
    let text = leaf.value_text();
    match parse_bool(&text) {
        Some(b) => Ok(b),
        None if policy.malformed_bool.is_reject() => Err(FilterError::InvalidBool {
            field: leaf.field.clone(),
            value: text,
        }),
        None => {
            debug!(field = %leaf.field, value = %text, "unrecognized boolean, using false");
            Ok(false)
        }
    }
}

/// Bound `index` of the leaf's list operand, following `missing_bound`.
///
/// A bound that is absent or null yields `None` when lenient.
pub fn bound_operand(
    leaf: &Leaf,
    index: usize,
    name: &'static str,
    policy: &FallbackPolicy,
) -> Result<Option<Bson>> {
    match leaf.values.get(index).filter(|v| **v != Bson::Null) {
        Some(value) => Ok(Some(value.clone())),
        None if policy.missing_bound.is_reject() => Err(FilterError::MissingBound {
            field: leaf.field.clone(),
            bound: name,
        }),
        None => {
            debug!(field = %leaf.field, bound = name, "between bound missing, leaving it open");
            Ok(None)
        }
    }
}
