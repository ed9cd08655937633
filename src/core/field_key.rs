use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonicalized header text used for equality between spreadsheet columns.
///
/// Always matches `[a-z0-9_]*` with no leading or trailing underscore, so
/// normalizing an already normalized key is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` when either key contains the other.
    #[must_use]
    pub fn overlaps(&self, other: &NormalizedKey) -> bool {
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NormalizedKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalizes a header string.
///
/// Pipeline: trim, lowercase, drop every `(...)` segment (up to the nearest
/// closing parenthesis), collapse runs of characters outside `[a-z0-9]` into a
/// single `_`, then trim underscores from both ends.
#[must_use]
pub fn normalize_key(header: &str) -> NormalizedKey {
    let lowered = header.trim().to_lowercase();
    let stripped = strip_parenthesized(&lowered);

    let mut out = String::with_capacity(stripped.len());
    let mut pending_separator = false;
    for ch in stripped.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    NormalizedKey(out)
}

/// Normalizes any scalar JSON value; `null` yields an empty key.
#[must_use]
pub fn normalize_value(value: &Value) -> NormalizedKey {
    match value {
        Value::Null => NormalizedKey::default(),
        Value::String(text) => normalize_key(text),
        other => normalize_key(&other.to_string()),
    }
}

fn strip_parenthesized(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close_offset) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close_offset + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_units_and_collapses_punctuation() {
        assert_eq!(normalize_key("Wind Speed (km/h)"), "wind_speed");
        assert_eq!(normalize_key("  Temp Udara (°C) "), "temp_udara");
        assert_eq!(normalize_key("EC (mS/cm) avg"), "ec_avg");
        assert_eq!(normalize_key("__pH--Level__"), "ph_level");
    }

    #[test]
    fn unclosed_parenthesis_is_treated_as_punctuation() {
        assert_eq!(normalize_key("Rain (mm"), "rain_mm");
    }

    #[test]
    fn null_value_yields_empty_key() {
        assert!(normalize_value(&Value::Null).is_empty());
        assert_eq!(normalize_value(&serde_json::json!(12.5)), "12_5");
    }
}
