//! Renames JSON object keys from `snake_case` to `camelCase`.
//!
//! The backend speaks snake_case column names while the rest of the app works
//! with camelCase records; rows go through [`to_camel_case`] right after they
//! come off the wire.

use serde_json::{Map, Value};

/// Recursively renames every object key in `value`. Arrays keep their order
/// and length, scalars and `null` are returned untouched.
pub fn to_camel_case(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(to_camel_case).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (camelize_key(&key), to_camel_case(value)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// `departure_date_time` -> `departureDateTime`.
///
/// Only an underscore followed by a lowercase ASCII letter is folded, so
/// `a_1` or a trailing `_` stay as they are and a second pass changes nothing.
pub fn camelize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}
