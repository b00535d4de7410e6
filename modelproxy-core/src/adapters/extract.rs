//! Generated-text extraction from blocking responses
//!
//! Backends disagree on where the answer lives. The lookup order below is the
//! contract of this layer; the first non-empty string wins and the whole
//! payload is returned serialized when nothing matches.

use crate::decode::extract_text_field;
use serde_json::Value;

/// Array-valued fields whose first element may carry the answer, with the
/// field read from that element.
const NESTED_FIELDS: &[(&str, &str)] = &[
    ("outputs", "text"),
    ("results", "text"),
    ("output", "content"),
];

/// Top-level fields tried last
const FLAT_FIELDS: &[&str] = &["generated_text", "text"];

/// Pick the generated text out of a blocking response body
pub fn extract_generated_text(payload: &Value) -> String {
    if let Some(content) = payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        return content.to_string();
    }

    if let Some(first) = payload.as_array().and_then(|items| items.first()) {
        if let Some(text) = extract_text_field(first, FLAT_FIELDS) {
            return text.to_string();
        }
    }

    for (array, field) in NESTED_FIELDS {
        if let Some(text) = payload
            .get(*array)
            .and_then(|items| items.get(0))
            .and_then(|first| extract_text_field(first, &[*field]))
        {
            return text.to_string();
        }
    }

    extract_text_field(payload, FLAT_FIELDS)
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}
