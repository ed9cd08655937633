use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::core::row::json_kind;
use crate::core::{RawRow, is_blank};
use crate::error::{ClimboxError, ClimboxResult};
use crate::ingest::Location;

/// Topic carrying a single location's readings.
///
/// With `wildcard` every sub-topic is included (`<base>/<id>/#`), otherwise
/// only the `latest` snapshot topic.
#[must_use]
pub fn location_topic(base: &str, location_id: &str, wildcard: bool) -> String {
    let base = base.trim_end_matches('/');
    if wildcard {
        format!("{base}/{location_id}/#")
    } else {
        format!("{base}/{location_id}/latest")
    }
}

/// Topics for a location list view: one wildcard, or one `latest` per location.
#[must_use]
pub fn list_topics(base: &str, locations: &[Location], wildcard: bool) -> Vec<String> {
    let base = base.trim_end_matches('/');
    if wildcard {
        return vec![format!("{base}/+/latest")];
    }
    locations
        .iter()
        .map(|loc| format!("{base}/{}/latest", loc.location_id))
        .collect()
}

/// Decoded live telemetry message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMessage {
    pub topic: String,
    /// From the payload's `locationId`, else the second topic segment.
    pub location_id: Option<String>,
    pub rows: Vec<RawRow>,
    pub timestamp: Option<Value>,
    pub row_count: Option<u64>,
}

impl LiveMessage {
    /// Decodes a JSON payload.
    ///
    /// Non-JSON payloads are rejected. A payload without usable rows still
    /// decodes (with empty `rows`) so list summaries can show its metadata.
    pub fn decode(topic: &str, payload: &[u8]) -> ClimboxResult<Self> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| ClimboxError::Payload(format!("message on `{topic}` is not json: {e}")))?;

        let payload_location = value
            .get("locationId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let location_id = payload_location.or_else(|| topic_location(topic));
        let timestamp = value.get("timestamp").filter(|v| !v.is_null()).cloned();
        let row_count = value.get("rowCount").and_then(Value::as_u64);
        let rows = extract_rows(value);
        trace!(topic, rows = rows.len(), "decoded live message");

        Ok(Self {
            topic: topic.to_owned(),
            location_id,
            rows,
            timestamp,
            row_count,
        })
    }

    #[must_use]
    pub fn last_row(&self) -> Option<&RawRow> {
        self.rows.last()
    }
}

/// Decodes the row list of a payload, rejecting payloads without rows.
pub fn decode_rows(payload: &[u8]) -> ClimboxResult<Vec<RawRow>> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| ClimboxError::Payload(format!("message is not json: {e}")))?;
    let kind = json_kind(&value);
    let rows = extract_rows(value);
    if rows.is_empty() {
        return Err(ClimboxError::Payload(format!(
            "{kind} message carries no usable rows"
        )));
    }
    Ok(rows)
}

fn topic_location(topic: &str) -> Option<String> {
    topic
        .split('/')
        .nth(1)
        .filter(|s| !s.is_empty() && *s != "+" && *s != "#")
        .map(str::to_owned)
}

/// Shapes, in priority order: bare array, `rows` array, `data` array, a
/// single reading carrying a `Timestamp` header, then the first array-valued
/// field.
fn extract_rows(value: Value) -> Vec<RawRow> {
    let mut object = match value {
        Value::Array(items) => return rows_from_array(items),
        Value::Object(object) => object,
        _ => return Vec::new(),
    };

    for field in ["rows", "data"] {
        if matches!(object.get(field), Some(Value::Array(_))) {
            if let Some(Value::Array(items)) = object.remove(field) {
                return rows_from_array(items);
            }
        }
    }

    if object.get("Timestamp").is_some_and(|ts| !is_blank(ts)) {
        return vec![object.into_iter().collect()];
    }

    let first_array = object
        .iter()
        .find(|(_, v)| v.is_array())
        .map(|(k, _)| k.clone());
    match first_array.and_then(|key| object.remove(&key)) {
        Some(Value::Array(items)) => rows_from_array(items),
        _ => Vec::new(),
    }
}

fn rows_from_array(items: Vec<Value>) -> Vec<RawRow> {
    items
        .into_iter()
        .filter_map(|item| RawRow::from_json(item).ok())
        .collect()
}

/// Compact `W:<water>°C A:<air>°C` text for a location list entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveTemperatures {
    pub water: Option<f64>,
    pub air: Option<f64>,
}

impl LiveTemperatures {
    /// Loose header scan over the row: `water`+`temp` (or `sst`) for water,
    /// `temp` with `udara` or `air` for air.
    #[must_use]
    pub fn from_row(row: &RawRow) -> Self {
        let mut out = Self::default();
        for (header, raw) in row.iter() {
            let lk = header.to_lowercase();
            let Some(number) = loose_number(raw) else {
                continue;
            };
            if lk.contains("water") && lk.contains("temp") {
                out.water = Some(number);
            }
            if lk.contains("temp") && (lk.contains("udara") || lk.contains("air")) {
                out.air = Some(number);
            }
            if out.water.is_none() && lk.contains("sst") {
                out.water = Some(number);
            }
        }
        out
    }

    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(water) = self.water {
            parts.push(format!("W:{water}°C"));
        }
        if let Some(air) = self.air {
            parts.push(format!("A:{air}°C"));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Text shown next to a location in the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSummary {
    pub location_id: Option<String>,
    pub text: String,
}

impl LiveSummary {
    /// Temperatures of the last row, `data` when it has none, `rows:<n>` when
    /// the message carried no rows.
    #[must_use]
    pub fn from_message(message: &LiveMessage) -> Self {
        let text = match message.last_row() {
            Some(row) => LiveTemperatures::from_row(row)
                .summary()
                .unwrap_or_else(|| "data".to_owned()),
            None => match message.row_count {
                Some(count) => format!("rows:{count}"),
                None => "rows:-".to_owned(),
            },
        };
        Self {
            location_id: message.location_id.clone(),
            text,
        }
    }
}

/// Number read used by list summaries; a decimal comma is accepted.
fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => text
            .trim()
            .replacen(',', ".", 1)
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
        _ => None,
    }
}
