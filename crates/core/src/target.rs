//! Target descriptors and per-candidate validation.
//!
//! Raw configuration entries stay as [`serde_json::Value`] until the
//! dispatcher validates them one by one, so a single bad entry never
//! blocks the rest of the run.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::protocol::TRIGGER_PATH;

/// Accepted base URL shape.
pub const URL_PATTERN: &str = r"^https?://.+";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(URL_PATTERN).expect("valid regex"));

/// JSON field holding the site base URL.
pub const URL_FIELD: &str = "url";
/// JSON field holding the shared secret.
pub const KEY_FIELD: &str = "key";

/// One validated remote site.
///
/// `auth_key` is never printed; the [`fmt::Debug`] impl redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Position of the entry in the configuration array.
    pub index: usize,
    /// Base URL with trailing slashes removed.
    pub base_url: String,
    pub auth_key: String,
}

impl TargetDescriptor {
    /// Validate a raw configuration entry and build a descriptor from it.
    ///
    /// Returns a human-readable reason on failure. The reason never
    /// contains the key value.
    pub fn from_candidate(index: usize, candidate: &Value) -> Result<Self, String> {
        let Some(fields) = candidate.as_object() else {
            return Err(format!("entry must be an object, got {}", json_kind(candidate)));
        };

        let url = match fields.get(URL_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(format!("'{URL_FIELD}' is missing or empty"));
            }
            Some(other) => {
                return Err(format!("'{URL_FIELD}' must be a string, got {}", json_kind(other)));
            }
        };

        // Checked after normalization so "https:///" cannot collapse to "https:".
        let base_url = normalize_base_url(url);
        if !URL_RE.is_match(base_url) {
            return Err(format!(
                "'{URL_FIELD}' must be http:// or https:// followed by a host, got '{url}'"
            ));
        }

        let key = match fields.get(KEY_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(format!("'{KEY_FIELD}' is missing or empty"));
            }
            Some(other) => {
                return Err(format!("'{KEY_FIELD}' must be a string, got {}", json_kind(other)));
            }
        };

        Ok(Self {
            index,
            base_url: base_url.to_string(),
            auth_key: key.clone(),
        })
    }

    /// Full trigger endpoint for this site.
    pub fn endpoint(&self) -> String {
        format!("{}{TRIGGER_PATH}", self.base_url)
    }
}

impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("index", &self.index)
            .field("base_url", &self.base_url)
            .field("auth_key", &"<redacted>")
            .finish()
    }
}

/// Strip every trailing `/` from a base URL.
pub fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
