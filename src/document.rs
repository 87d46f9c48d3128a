//! Target documents handed to the data-store driver.
//!
//! Compiled filters are plain [`bson`] documents, so they can be passed to a
//! MongoDB driver unchanged. This module adds the few conversions the
//! compiler needs on top: a text view of a scalar, JSON payload values to
//! BSON, and BSON back to relaxed extended JSON.

use chrono::{DateTime as ChronoDateTime, Utc};

pub use bson::{doc, Bson, DateTime, Document, Regex};

/// Alias kept for callers that think of operands as plain values.
pub type Value = Bson;

/// Build a regular-expression value.
pub fn bson_regex(pattern: impl Into<String>, options: impl Into<String>) -> Regex {
    Regex {
        pattern: pattern.into(),
        options: options.into(),
    }
}

/// Convert a parsed timestamp into a BSON datetime (millisecond precision).
pub fn datetime(dt: ChronoDateTime<Utc>) -> DateTime {
    DateTime::from_millis(dt.timestamp_millis())
}

/// Text view of a scalar, as used by operators that work on strings.
///
/// Null reads as empty text, strings as-is, numbers and booleans formatted.
/// Anything else renders as relaxed extended JSON.
pub fn value_text(value: &Bson) -> String {
    match value {
        Bson::Null => String::new(),
        Bson::String(s) => s.clone(),
        Bson::Boolean(b) => b.to_string(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(d) => d.to_string(),
        Bson::RegularExpression(re) => re.pattern.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// Convert a decoded JSON payload value into BSON.
///
/// Integers that fit in 32 bits become `Int32`, larger ones `Int64`, and
/// everything else numeric `Double`. Objects keep their key order and are
/// not interpreted as extended JSON.
pub fn from_json(json: serde_json::Value) -> Bson {
    use serde_json::Value as Json;

    match json {
        Json::Null => Bson::Null,
        Json::Bool(b) => Bson::Boolean(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(i),
            },
            None => Bson::Double(n.as_f64().unwrap_or_default()),
        },
        Json::String(s) => Bson::String(s),
        Json::Array(items) => Bson::Array(items.into_iter().map(from_json).collect()),
        Json::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect(),
        ),
    }
}

/// Render a value as relaxed extended JSON.
pub fn to_json(value: &Bson) -> serde_json::Value {
    value.clone().into_relaxed_extjson()
}

/// Render a document as relaxed extended JSON, keeping key order.
pub fn document_to_json(document: &Document) -> serde_json::Value {
    to_json(&Bson::Document(document.clone()))
}
