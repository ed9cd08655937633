use std::fmt;

use chrono::FixedOffset;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::config::{ArrowRange, ClimboxConfig};
use crate::core::{
    PLACEHOLDER, RawRow, as_number, display_text, format_optional, is_blank, normalize_key,
    numeric_or_raw, parse_timestamp,
};

/// Gauge sweep, in degrees, for the bottom and top of [`ArrowRange`].
pub const ARROW_START_DEG: f64 = -89.0;
pub const ARROW_END_DEG: f64 = 190.0;

/// Latest reading split into the configured sensor groups.
///
/// Group values are keyed by normalized field name and hold a number when
/// the picked value parses as one, otherwise the raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedReading {
    pub timestamp: Option<Value>,
    pub groups: IndexMap<String, IndexMap<String, Value>>,
}

impl GroupedReading {
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.groups.get(name)
    }

    #[must_use]
    pub fn value(&self, group: &str, field: &str) -> Option<&Value> {
        self.groups
            .get(group)
            .and_then(|values| values.get(normalize_key(field).as_str()))
    }
}

/// Groups one row according to `SENSOR_GROUPS`.
#[must_use]
pub fn group_row(row: &RawRow, config: &ClimboxConfig) -> GroupedReading {
    let resolver = config.resolver();
    let flat = row.flatten_normalized();

    let timestamp = resolver
        .pick(row, &config.timestamp_candidates())
        .value()
        .filter(|v| !is_blank(v))
        .or_else(|| row.get("Timestamp"))
        .or_else(|| row.get("timestamp"))
        .cloned();

    let groups = config
        .sensor_groups
        .iter()
        .map(|(group, fields)| {
            let values = fields
                .iter()
                .map(|field| {
                    let key = normalize_key(field);
                    let candidates = resolver.candidates_for(field);
                    let raw = resolver
                        .pick(row, &candidates)
                        .value()
                        .or_else(|| flat.get(&key))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (key.into_string(), numeric_or_raw(raw))
                })
                .collect();
            (group.clone(), values)
        })
        .collect();

    GroupedReading { timestamp, groups }
}

/// The six dashboard cards, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardGroup {
    Meteorologi,
    Presipitasi,
    KualitasFisika,
    KualitasKimiaDasar,
    KualitasKimiaLanjut,
    KualitasTurbiditas,
}

impl CardGroup {
    pub const ALL: [Self; 6] = [
        Self::Meteorologi,
        Self::Presipitasi,
        Self::KualitasFisika,
        Self::KualitasKimiaDasar,
        Self::KualitasKimiaLanjut,
        Self::KualitasTurbiditas,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meteorologi => "meteorologi",
            Self::Presipitasi => "presipitasi",
            Self::KualitasFisika => "kualitas_fisika",
            Self::KualitasKimiaDasar => "kualitas_kimia_dasar",
            Self::KualitasKimiaLanjut => "kualitas_kimia_lanjut",
            Self::KualitasTurbiditas => "kualitas_turbiditas",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|group| group.as_str() == name)
    }
}

impl fmt::Display for CardGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub label: String,
    pub text: String,
}

impl CardField {
    fn new(label: &str, text: String) -> Self {
        Self {
            label: label.to_owned(),
            text,
        }
    }
}

/// Display-ready content of one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub group: CardGroup,
    pub headline: String,
    pub fields: Vec<CardField>,
    /// `Last data received: ...` line; absent without a timestamp.
    pub last_updated: Option<String>,
    /// Water-temperature gauge rotation in degrees, physical-quality card only.
    pub arrow_angle: Option<f64>,
}

impl CardView {
    #[must_use]
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.text.as_str())
    }
}

/// Builds all six cards; fields missing from the reading render `--`.
#[must_use]
pub fn build_cards(grouped: &GroupedReading, config: &ClimboxConfig) -> Vec<CardView> {
    let last_updated = grouped
        .timestamp
        .as_ref()
        .filter(|ts| !is_blank(ts))
        .map(|ts| format!("Last data received: {}", timestamp_text(ts, config.station_offset())));
    let empty = IndexMap::new();

    CardGroup::ALL
        .into_iter()
        .map(|group| {
            let values = grouped.group(group.as_str()).unwrap_or(&empty);
            let mut card = build_card(group, &GroupValues(values), config.arrow);
            card.last_updated.clone_from(&last_updated);
            card
        })
        .collect()
}

/// Maps a water temperature onto the gauge sweep.
///
/// The value is clamped to the range, mapped linearly onto
/// [`ARROW_START_DEG`]..[`ARROW_END_DEG`] and wrapped into `[-180, 180)`.
/// A missing temperature parks the arrow at `0`.
#[must_use]
pub fn gauge_angle(water_temp: Option<f64>, range: ArrowRange) -> f64 {
    let Some(temp) = water_temp else {
        return 0.0;
    };
    let span = range.max - range.min;
    if span <= 0.0 {
        return 0.0;
    }
    let t = (temp.clamp(range.min, range.max) - range.min) / span;
    let angle = ARROW_START_DEG + t * (ARROW_END_DEG - ARROW_START_DEG);
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

struct GroupValues<'a>(&'a IndexMap<String, Value>);

impl GroupValues<'_> {
    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    fn first(&self, fields: &[&str]) -> Option<&Value> {
        fields.iter().find_map(|field| self.get(field))
    }

    fn number(&self, fields: &[&str]) -> Option<f64> {
        as_number(self.first(fields))
    }

    fn present_text(&self, field: &str) -> Option<String> {
        self.get(field)
            .filter(|v| !is_blank(v))
            .map(|v| display_text(Some(v)))
    }
}

/// Loose truthiness: null, `false`, zero, NaN and empty text are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn build_card(group: CardGroup, values: &GroupValues<'_>, arrow: ArrowRange) -> CardView {
    let mut arrow_angle = None;
    let (headline, fields) = match group {
        CardGroup::Meteorologi => {
            let headline = values
                .number(&["air_temp", "temp_udara"])
                .or_else(|| values.number(&["wind_speed"]));
            // Zero humidity renders the placeholder.
            let humidity = if values.get("humidity").is_some_and(is_truthy) {
                format!("RH {}", format_optional(values.number(&["humidity"]), "%"))
            } else {
                PLACEHOLDER.to_owned()
            };
            (
                format_optional(headline, "°C"),
                vec![
                    CardField::new(
                        "Wind direction",
                        values.present_text("wind_direction").unwrap_or_else(|| "-".to_owned()),
                    ),
                    CardField::new("Wind speed", format_optional(values.number(&["wind_speed"]), " km/h")),
                    CardField::new("Humidity", humidity),
                ],
            )
        }
        CardGroup::Presipitasi => (
            format_optional(values.number(&["rainfall"]), " mm"),
            vec![CardField::new("Distance", format_optional(values.number(&["distance"]), " cm"))],
        ),
        CardGroup::KualitasFisika => {
            let water_temp = values.number(&["water_temp", "watertemp"]);
            arrow_angle = Some(gauge_angle(water_temp, arrow));
            let coord = |field: &str| values.present_text(field).unwrap_or_else(|| "-".to_owned());
            (
                format_optional(water_temp, "°C"),
                vec![
                    CardField::new("EC", format_optional(values.number(&["ec", "ec_ms_cm"]), "")),
                    CardField::new(
                        "Coordinates",
                        format!("Lat: {}, Lon: {}", coord("latitude"), coord("longitude")),
                    ),
                ],
            )
        }
        CardGroup::KualitasKimiaDasar => {
            let tds = values.number(&["tds"]);
            (
                format_optional(tds, " ppm"),
                vec![
                    CardField::new("pH", format_optional(values.number(&["ph"]), "")),
                    CardField::new("TDS", format_optional(tds, " ppm")),
                ],
            )
        }
        CardGroup::KualitasKimiaLanjut => {
            let pumps: Vec<String> = [
                ("Pompa Laut", values.first(&["pompa_air_laut", "pompa_laut"])),
                ("Pompa Bilas", values.first(&["pompa_bilas"])),
            ]
            .into_iter()
            .filter_map(|(label, value)| {
                value
                    .filter(|v| !is_blank(v))
                    .map(|v| format!("{label}: {}", display_text(Some(v))))
            })
            .collect();
            let pumps = if pumps.is_empty() {
                PLACEHOLDER.to_owned()
            } else {
                pumps.join(" ")
            };
            (
                format_optional(values.number(&["do"]), " mg/L"),
                vec![CardField::new("Pumps", pumps)],
            )
        }
        CardGroup::KualitasTurbiditas => {
            let tss = values.number(&["tss"]);
            (
                format_optional(tss, ""),
                vec![CardField::new("Depth", format_optional(tss, ""))],
            )
        }
    };

    CardView {
        group,
        headline,
        fields,
        last_updated: None,
        arrow_angle,
    }
}

fn timestamp_text(value: &Value, offset: FixedOffset) -> String {
    match parse_timestamp(value, offset) {
        Some(ts) => ts.format("%d/%m/%Y %H:%M:%S").to_string(),
        None => display_text(Some(value)),
    }
}
