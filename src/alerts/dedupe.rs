use indexmap::IndexMap;
use tracing::trace;

use crate::alerts::evaluator::{Alert, AlertLevel, AlertParameter};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub location_id: String,
    pub parameter: AlertParameter,
    pub level: AlertLevel,
}

impl AlertKey {
    #[must_use]
    pub fn of(alert: &Alert) -> Self {
        Self {
            location_id: alert.location_id.clone(),
            parameter: alert.parameter,
            level: alert.level,
        }
    }
}

/// Remembers the last time text emitted per `(location, parameter, level)`.
///
/// An alert passes only when its time text differs from the remembered one.
/// Alerts without time text always pass. The map holds at most `capacity`
/// keys; admitting a new key at capacity evicts the least recently emitted key.
#[derive(Debug, Clone)]
pub struct AlertDeduplicator {
    last_fired: IndexMap<AlertKey, String>,
    capacity: usize,
    evictions: u64,
}

impl Default for AlertDeduplicator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl AlertDeduplicator {
    pub const DEFAULT_CAPACITY: usize = 1024;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            last_fired: IndexMap::new(),
            capacity: capacity.max(1),
            evictions: 0,
        }
    }

    /// Returns `true` when the alert should be emitted, recording it if so.
    pub fn admit(&mut self, alert: &Alert) -> bool {
        let key = AlertKey::of(alert);
        if !alert.time_text.is_empty()
            && self.last_fired.get(&key).is_some_and(|last| *last == alert.time_text)
        {
            trace!(
                location = %key.location_id,
                parameter = key.parameter.as_str(),
                "suppressing repeated alert"
            );
            return false;
        }

        self.last_fired.shift_remove(&key);
        if self.last_fired.len() >= self.capacity {
            self.last_fired.shift_remove_index(0);
            self.evictions = self.evictions.saturating_add(1);
        }
        self.last_fired.insert(key, alert.time_text.clone());
        true
    }

    #[must_use]
    pub fn last_time_text(&self, key: &AlertKey) -> Option<&str> {
        self.last_fired.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn clear(&mut self) {
        self.last_fired.clear();
    }
}
