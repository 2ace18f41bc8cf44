/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use serde::Deserialize;
use serde_json::Value;

// Ipernity sends most numbers and flags as strings ("1", "25"), so every
// accessor here accepts both representations.

// Reads an integer from a JSON number or numeric string
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

// Reads an identifier that may come back as a string or a number
pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Flags are "0"/"1", 0/1 or booleans. Anything absent or unparsable is false.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    value.and_then(as_i64).is_some_and(|v| v != 0)
}

// Parses a flag field into a bool
pub fn from_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Value = Deserialize::deserialize(deserializer)?;
    Ok(is_truthy(Some(&v)))
}

// Parses ids that are strings or numbers into a String
pub fn from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Value = Deserialize::deserialize(deserializer)?;
    as_string(&v).ok_or_else(|| {
        serde::de::Error::custom(format!("expected string or number, got {v}"))
    })
}

// Parses strings (or numbers) that may be "" and sets to None
pub fn from_empty_str_to_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<Value> = Deserialize::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(as_string).filter(|s| !s.is_empty()))
}
