//! Text extraction by field precedence

use serde_json::Value;

/// Return the first candidate field holding a non-empty string.
///
/// Missing fields, non-string values and empty strings all fall through to the
/// next candidate. Non-object values never match.
pub fn extract_text_field<'a>(value: &'a Value, candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    })
}

/// Delta for a parsed frame: the first matching field, else the serialized value
pub(crate) fn delta_or_serialized(value: &Value, candidates: &[&str]) -> String {
    extract_text_field(value, candidates)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_order() {
        let value = json!({"text": "t", "delta": "d"});
        assert_eq!(extract_text_field(&value, &["delta", "text"]), Some("d"));
        assert_eq!(extract_text_field(&value, &["text", "delta"]), Some("t"));
    }

    #[test]
    fn test_empty_and_non_string_fall_through() {
        let value = json!({"delta": "", "text": 3, "chunk": "c"});
        assert_eq!(
            extract_text_field(&value, &["delta", "text", "chunk"]),
            Some("c")
        );
    }

    #[test]
    fn test_serialized_fallback() {
        let value = json!({"id": 1});
        assert_eq!(delta_or_serialized(&value, &["delta"]), r#"{"id":1}"#);
        assert_eq!(delta_or_serialized(&json!(42), &["delta"]), "42");
    }
}
