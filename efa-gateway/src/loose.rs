//! Tolerant decoding of loosely-typed upstream fields.
//!
//! EFA deployments disagree on field types: the same logical value arrives
//! as `"5"` from one server and `5` from another, booleans as `true`, `1`
//! or `"yes"`. Everything in this module degrades to a caller-supplied
//! fallback instead of failing, so schema drift upstream never reaches the
//! caller as an error.
//!
//! The `parse_*` functions report whether a value could be read at all;
//! the `*_or` functions are the named fallback path used by the resolver
//! and normalizer.

use serde_json::{Map, Value};

/// Returns true for the truthy spellings `"1"`, `"true"` and `"yes"`
/// (case-insensitive). Whitespace is significant: `" true"` is false.
pub fn is_truthy(s: &str) -> bool {
    s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
}

/// Read an integer from a native number or from a string.
///
/// Floats are truncated towards zero. Strings are read up to the first
/// non-digit after optional leading whitespace and sign, so `"5 min"`
/// reads as 5 and `"-2"` as -2. Returns `None` for anything else.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Read a boolean from a native bool, an integer (non-zero is true) or a
/// string (truthy spellings are true, any other string is false).
/// Non-integer numbers are unreadable.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.as_i64() != Some(0)),
        Value::String(s) => Some(is_truthy(s)),
        _ => None,
    }
}

/// Read a string, rendering numbers and booleans in their JSON form.
pub fn parse_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer or fallback.
pub fn int_or(value: &Value, fallback: i64) -> i64 {
    parse_int(value).unwrap_or(fallback)
}

/// Boolean or fallback.
pub fn bool_or(value: &Value, fallback: bool) -> bool {
    parse_bool(value).unwrap_or(fallback)
}

/// String or fallback.
pub fn string_or(value: &Value, fallback: &str) -> String {
    parse_string(value).unwrap_or_else(|| fallback.to_string())
}

/// Look up the first key present in `obj`.
///
/// Only presence decides which spelling is used; a present key with an
/// unreadable value does not fall through to the next spelling.
pub fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// Integer from the first present key, or fallback.
pub fn int_field(obj: &Map<String, Value>, keys: &[&str], fallback: i64) -> i64 {
    first_present(obj, keys).map_or(fallback, |v| int_or(v, fallback))
}

/// Boolean from the first key whose value is readable, or fallback.
///
/// Unlike [`int_field`], a present key with an unreadable value (`null`,
/// a float, an object) falls through to the next spelling.
pub fn bool_field(obj: &Map<String, Value>, keys: &[&str], fallback: bool) -> bool {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(parse_bool)
        .unwrap_or(fallback)
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
