use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::field_key::{NormalizedKey, normalize_key};
use crate::error::{ClimboxError, ClimboxResult};

/// One spreadsheet or telemetry record keyed by uncontrolled header text.
///
/// Header order is preserved; fallback matching walks headers in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(IndexMap<String, Value>);

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from header/value pairs. Later duplicates replace earlier ones.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Converts a JSON object into a row; other JSON shapes are rejected.
    pub fn from_json(value: Value) -> ClimboxResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ClimboxError::InvalidData(format!(
                "row must be a json object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn insert(&mut self, header: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(header.into(), value)
    }

    #[must_use]
    pub fn get(&self, header: &str) -> Option<&Value> {
        self.0.get(header)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(normalized header, original header, value)` triples.
    pub fn normalized(&self) -> impl Iterator<Item = (NormalizedKey, &str, &Value)> {
        self.0
            .iter()
            .map(|(k, v)| (normalize_key(k), k.as_str(), v))
    }

    /// Returns a row copy keyed by normalized headers; later collisions win.
    #[must_use]
    pub fn flatten_normalized(&self) -> IndexMap<NormalizedKey, Value> {
        self.0
            .iter()
            .map(|(k, v)| (normalize_key(k), v.clone()))
            .collect()
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
