//! Store value decoding.
//!
//! Values are JSON most of the time, but some older keys hold bare strings.
//! Anything that is neither is dropped.

use serde_json::Value;

/// Decode a raw value: JSON first, then raw UTF-8 as a JSON string.
pub fn decode(raw: &[u8]) -> Option<Value> {
    if let Ok(value) = serde_json::from_slice::<Value>(raw) {
        return Some(value);
    }
    std::str::from_utf8(raw)
        .ok()
        .map(|text| Value::String(text.to_string()))
}

/// Interpret a decoded value as an enabled flag.
///
/// Only JSON `true` and the string `"true"` count; everything else,
/// including `1` and `"True"`, is `false`.
pub fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Render a decoded value as a plain string.
///
/// Strings lose their quotes, `null` becomes `None`, other values keep
/// their JSON text.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
