//! Parsing of the raw target configuration string.

use serde_json::Value;

use crate::error::ConfigError;

/// Parse the raw configuration into the ordered list of candidate entries.
///
/// Individual entries are returned untouched; their validation happens per
/// target at dispatch time. An empty array is a valid, empty run.
pub fn parse_targets(raw: Option<&str>) -> Result<Vec<Value>, ConfigError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(ConfigError::Missing),
    };

    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(format!("invalid JSON: {e}")))?;

    match parsed {
        Value::Array(entries) => Ok(entries),
        other => Err(ConfigError::Malformed(format!(
            "expected a JSON array of targets, got {}",
            match other {
                Value::Object(_) => "an object",
                Value::String(_) => "a string",
                Value::Number(_) => "a number",
                Value::Bool(_) => "a boolean",
                _ => "null",
            }
        ))),
    }
}
