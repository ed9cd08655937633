use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use crate::api::cards::GroupedReading;
use crate::core::RawRow;
use crate::error::ClimboxResult;

/// Storage key for a location's cached snapshot: `<prefix>_sensor_<location>`.
#[must_use]
pub fn cache_key(prefix: &str, location_id: &str) -> String {
    format!("{prefix}_sensor_{location_id}")
}

/// Last processed rows of a location, as written after every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub fetched_at: DateTime<Utc>,
    pub last_timestamp: Option<Value>,
    pub raw: Vec<RawRow>,
    pub grouped: GroupedReading,
}

impl CacheEntry {
    pub fn to_json(&self) -> ClimboxResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> ClimboxResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// String key/value store holding serialized cache entries.
pub trait CacheStore {
    fn get(&self, key: &str) -> ClimboxResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> ClimboxResult<()>;
    fn remove(&mut self, key: &str) -> ClimboxResult<()>;
}

/// Process-local store; entries live as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    entries: IndexMap<String, String>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> ClimboxResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> ClimboxResult<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ClimboxResult<()> {
        self.entries.shift_remove(key);
        Ok(())
    }
}

/// Writes an entry; failures are logged and swallowed.
pub fn write_entry<S: CacheStore + ?Sized>(store: &mut S, key: &str, entry: &CacheEntry) {
    match entry.to_json().and_then(|json| store.set(key, json)) {
        Ok(()) => trace!(key, rows = entry.raw.len(), "cache entry written"),
        Err(err) => warn!(key, error = %err, "cache write failed"),
    }
}

/// Reads an entry; missing, unreadable or malformed entries yield `None`.
pub fn read_entry<S: CacheStore + ?Sized>(store: &S, key: &str) -> Option<CacheEntry> {
    let text = match store.get(key) {
        Ok(text) => text?,
        Err(err) => {
            warn!(key, error = %err, "cache read failed");
            return None;
        }
    };
    match CacheEntry::from_json(&text) {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!(key, error = %err, "discarding malformed cache entry");
            None
        }
    }
}
