use chrono::FixedOffset;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::alerts::{AlertDeduplicator, Thresholds};
use crate::core::{
    AliasSet, DEFAULT_TIMESTAMP_CANDIDATES, FieldResolver, normalize_key, offset_from_minutes,
};
use crate::error::{ClimboxError, ClimboxResult};

/// Dashboard configuration.
///
/// Keys use the `SCREAMING_SNAKE_CASE` names of the deployed `config.json`,
/// so an existing file deserializes unchanged. Build it once at startup and
/// share it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ClimboxConfig {
    #[serde(default = "default_location_id")]
    pub location_id: String,
    #[serde(default = "default_history_points")]
    pub history_points: usize,
    #[serde(default = "default_gviz_range")]
    pub gviz_range: String,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default = "default_sheet_name_token_date")]
    pub sheet_name_token_date: String,
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
    /// Chart keys: canonical key to header candidates.
    #[serde(default)]
    pub keys: IndexMap<String, Vec<String>>,
    /// Explicit aliases, tried before `keys`.
    #[serde(default)]
    pub field_aliases: IndexMap<String, Vec<String>>,
    /// Card group name to canonical fields.
    #[serde(default)]
    pub sensor_groups: IndexMap<String, Vec<String>>,
    /// Shortest normalized candidate allowed in substring matching; `0` disables the guard.
    #[serde(default)]
    pub fallback_min_key_len: usize,
    #[serde(default = "default_station_utc_offset_minutes")]
    pub station_utc_offset_minutes: i32,
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub arrow: ArrowRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MqttConfig {
    /// Broker websocket URL; empty disables live updates.
    #[serde(default)]
    pub mqtt_ws: String,
    #[serde(default)]
    pub mqtt_username: String,
    #[serde(default)]
    pub mqtt_password: String,
    #[serde(default = "default_mqtt_topic_base")]
    pub mqtt_topic_base: String,
    #[serde(default = "default_true")]
    pub mqtt_subscribe_wildcard: bool,
    #[serde(default = "default_mqtt_reconnect_period_ms")]
    pub mqtt_reconnect_period_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            mqtt_ws: String::new(),
            mqtt_username: String::new(),
            mqtt_password: String::new(),
            mqtt_topic_base: default_mqtt_topic_base(),
            mqtt_subscribe_wildcard: true,
            mqtt_reconnect_period_ms: default_mqtt_reconnect_period_ms(),
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.mqtt_ws.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AlertConfig {
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_dedupe_capacity")]
    pub dedupe_capacity: usize,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            poll_seconds: default_poll_seconds(),
            max_items: default_max_items(),
            dedupe_capacity: default_dedupe_capacity(),
            thresholds: Thresholds::default(),
        }
    }
}

/// Water-temperature range mapped onto the gauge arrow sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowRange {
    #[serde(default = "default_arrow_min")]
    pub min: f64,
    #[serde(default = "default_arrow_max")]
    pub max: f64,
}

impl Default for ArrowRange {
    fn default() -> Self {
        Self {
            min: default_arrow_min(),
            max: default_arrow_max(),
        }
    }
}

impl Default for ClimboxConfig {
    fn default() -> Self {
        Self {
            location_id: default_location_id(),
            history_points: default_history_points(),
            gviz_range: default_gviz_range(),
            sheet_id: None,
            sheet_name: None,
            sheet_name_token_date: default_sheet_name_token_date(),
            cache_prefix: default_cache_prefix(),
            keys: IndexMap::new(),
            field_aliases: IndexMap::new(),
            sensor_groups: IndexMap::new(),
            fallback_min_key_len: 0,
            station_utc_offset_minutes: default_station_utc_offset_minutes(),
            mqtt: MqttConfig::default(),
            alerts: AlertConfig::default(),
            arrow: ArrowRange::default(),
        }
    }
}

impl ClimboxConfig {
    /// Parses one JSON document on top of the defaults.
    pub fn from_json_str(input: &str) -> ClimboxResult<Self> {
        let layer: Value = serde_json::from_str(input)
            .map_err(|e| ClimboxError::InvalidConfig(format!("config is not valid json: {e}")))?;
        Self::from_layers([layer])
    }

    /// Deep-merges JSON layers over the defaults, later layers winning.
    ///
    /// Typical order is the external `config.json`, then a host override.
    /// Nested objects merge key by key; arrays and scalars replace.
    pub fn from_layers<I>(layers: I) -> ClimboxResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut merged = serde_json::to_value(Self::default())?;
        let mut count = 0_usize;
        for layer in layers {
            if !layer.is_object() && !layer.is_null() {
                return Err(ClimboxError::InvalidConfig(
                    "config layer must be a json object".to_owned(),
                ));
            }
            deep_merge(&mut merged, layer);
            count += 1;
        }
        let config: Self = serde_json::from_value(merged)
            .map_err(|e| ClimboxError::InvalidConfig(format!("config shape mismatch: {e}")))?;
        debug!(layers = count, location = %config.location_id, "config resolved");
        config.validate()
    }

    pub fn validate(self) -> ClimboxResult<Self> {
        if self.history_points == 0 {
            return Err(ClimboxError::InvalidConfig(
                "HISTORY_POINTS must be > 0".to_owned(),
            ));
        }
        if self.alerts.max_items == 0 {
            return Err(ClimboxError::InvalidConfig(
                "ALERTS.MAX_ITEMS must be > 0".to_owned(),
            ));
        }
        if self.alerts.poll_seconds == 0 {
            return Err(ClimboxError::InvalidConfig(
                "ALERTS.POLL_SECONDS must be > 0".to_owned(),
            ));
        }
        if !(self.arrow.min.is_finite() && self.arrow.max.is_finite() && self.arrow.min < self.arrow.max)
        {
            return Err(ClimboxError::InvalidConfig(
                "ARROW.min must be finite and below ARROW.max".to_owned(),
            ));
        }
        if self.station_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ClimboxError::InvalidConfig(format!(
                "STATION_UTC_OFFSET_MINUTES out of range: {}",
                self.station_utc_offset_minutes
            )));
        }
        self.alerts.thresholds.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = location_id.into();
        self
    }

    #[must_use]
    pub fn with_keys<I, S>(mut self, canonical: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.insert(
            normalize_key(canonical).into_string(),
            candidates.into_iter().map(Into::into).collect(),
        );
        self
    }

    #[must_use]
    pub fn with_field_alias<I, S>(mut self, canonical: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_aliases.insert(
            normalize_key(canonical).into_string(),
            aliases.into_iter().map(Into::into).collect(),
        );
        self
    }

    #[must_use]
    pub fn with_sensor_group<I, S>(mut self, group: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensor_groups
            .insert(group.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_history_points(mut self, history_points: usize) -> Self {
        self.history_points = history_points;
        self
    }

    #[must_use]
    pub fn alias_set(&self) -> AliasSet {
        AliasSet::new(self.field_aliases.clone(), self.keys.clone())
    }

    #[must_use]
    pub fn resolver(&self) -> FieldResolver {
        FieldResolver::new(self.alias_set()).with_fallback_min_len(self.fallback_min_key_len)
    }

    #[must_use]
    pub fn station_offset(&self) -> FixedOffset {
        offset_from_minutes(self.station_utc_offset_minutes)
    }

    /// `KEYS.timestamp` when configured, else the built-in timestamp headers.
    #[must_use]
    pub fn timestamp_candidates(&self) -> Vec<String> {
        match self.keys.get("timestamp") {
            Some(list) if !list.is_empty() => list.clone(),
            _ => DEFAULT_TIMESTAMP_CANDIDATES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn deduplicator(&self) -> AlertDeduplicator {
        AlertDeduplicator::new(self.alerts.dedupe_capacity)
    }
}

/// Recursively merges `src` into `target`.
///
/// Objects merge per key; any other `src` value replaces the target. `null`
/// members of `src` leave the target untouched.
pub fn deep_merge(target: &mut Value, src: Value) {
    match (target, src) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(src)) => {
            for (key, value) in src {
                if value.is_null() {
                    continue;
                }
                let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
                if nested {
                    if let Some(existing) = target.get_mut(&key) {
                        deep_merge(existing, value);
                    }
                } else {
                    target.insert(key, value);
                }
            }
        }
        (target, src) => *target = src,
    }
}

fn default_location_id() -> String {
    "pulau_komodo".to_owned()
}

fn default_history_points() -> usize {
    20
}

fn default_gviz_range() -> String {
    "A:Z".to_owned()
}

fn default_sheet_name_token_date() -> String {
    "{date}".to_owned()
}

fn default_cache_prefix() -> String {
    "climbox_cache".to_owned()
}

fn default_station_utc_offset_minutes() -> i32 {
    7 * 60
}

fn default_mqtt_topic_base() -> String {
    "climbox".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_mqtt_reconnect_period_ms() -> u64 {
    5_000
}

fn default_poll_seconds() -> u64 {
    60
}

fn default_max_items() -> usize {
    6
}

fn default_dedupe_capacity() -> usize {
    AlertDeduplicator::DEFAULT_CAPACITY
}

fn default_arrow_min() -> f64 {
    20.0
}

fn default_arrow_max() -> f64 {
    40.0
}
