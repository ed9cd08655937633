use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alerts::thresholds::{BandLimits, Thresholds, UpperLimits};
use crate::api::ClimboxConfig;
use crate::core::{FieldResolver, RawRow, alert_time_text, as_number, parse_timestamp};
use crate::error::ClimboxResult;
use crate::ingest::Location;

/// Alert severity; `Danger` orders above `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
}

impl AlertLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Danger => "Danger",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitored measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertParameter {
    Wind,
    Rain,
    WaterTemp,
    Tss,
}

impl AlertParameter {
    pub const ALL: [Self; 4] = [Self::Wind, Self::Rain, Self::WaterTemp, Self::Tss];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Rain => "rain",
            Self::WaterTemp => "water_temp",
            Self::Tss => "tss",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Wind => "Wind",
            Self::Rain => "Rainfall",
            Self::WaterTemp => "Water Temp",
            Self::Tss => "TSS",
        }
    }

    /// Sheet headers tried, in order, when picking this parameter from a row.
    #[must_use]
    pub fn header_candidates(self) -> &'static [&'static str] {
        match self {
            Self::Wind => &["Wind Speed (km/h)", "Wind Speed", "wind_speed", "wind speed", "wind"],
            Self::Rain => &["Rainfall (mm)", "Rainfall", "rainfall", "rain", "Rain(mm)"],
            Self::WaterTemp => &["Water Temp (C)", "Water Temp", "water_temp", "water temp", "WaterTemp"],
            Self::Tss => &["TSS (V)", "TSS", "tss", "turbidity", "tss_v"],
        }
    }
}

impl fmt::Display for AlertParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALERT_TIMESTAMP_CANDIDATES: [&str; 5] = ["Timestamp", "timestamp", "time", "date", "cachedAt"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub parameter: AlertParameter,
    pub location_id: String,
    pub title: String,
    pub message: String,
    /// Row timestamp rendered as `DD Mon: HH:MM` in station time.
    pub time_text: String,
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub value: f64,
}

/// Compares picked row values against configured thresholds.
///
/// Emits at most one alert per parameter; a danger condition suppresses the
/// warning for the same parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvaluator {
    thresholds: Thresholds,
    resolver: FieldResolver,
    station_offset: FixedOffset,
}

impl AlertEvaluator {
    #[must_use]
    pub fn new(thresholds: Thresholds, station_offset: FixedOffset) -> Self {
        Self {
            thresholds,
            resolver: FieldResolver::default(),
            station_offset,
        }
    }

    pub fn from_config(config: &ClimboxConfig) -> ClimboxResult<Self> {
        let thresholds = config.alerts.thresholds.validate()?;
        Ok(Self {
            thresholds,
            resolver: FieldResolver::default().with_fallback_min_len(config.fallback_min_key_len),
            station_offset: config.station_offset(),
        })
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    #[must_use]
    pub fn evaluate(&self, location: &Location, row: &RawRow) -> Vec<Alert> {
        let ts_raw = self.resolver.pick(row, &ALERT_TIMESTAMP_CANDIDATES).value();
        let time_text = alert_time_text(ts_raw, self.station_offset);
        let observed_at = ts_raw.and_then(|v| parse_timestamp(v, self.station_offset));

        let mut alerts = Vec::new();
        for parameter in AlertParameter::ALL {
            let Some(value) = as_number(self.resolver.pick(row, parameter.header_candidates()).value())
            else {
                continue;
            };
            let Some((level, message)) = self.classify(parameter, value) else {
                continue;
            };
            debug!(
                location = %location.location_id,
                parameter = parameter.as_str(),
                level = level.as_str(),
                value,
                "threshold crossed"
            );
            alerts.push(Alert {
                level,
                parameter,
                location_id: location.location_id.clone(),
                title: format!("{}: {}", location.display_name(), parameter.title()),
                message,
                time_text: time_text.clone(),
                observed_at,
                value,
            });
        }
        alerts
    }

    fn classify(&self, parameter: AlertParameter, value: f64) -> Option<(AlertLevel, String)> {
        match parameter {
            AlertParameter::Wind => upper_level(self.thresholds.wind_kmh, value)
                .map(|(level, limit)| (level, format!("Wind speed {value} km/h (>= {limit})"))),
            AlertParameter::Rain => upper_level(self.thresholds.rainfall_mm, value)
                .map(|(level, limit)| (level, format!("Rainfall {value} mm (>= {limit})"))),
            AlertParameter::Tss => upper_level(self.thresholds.tss, value)
                .map(|(level, limit)| (level, format!("TSS {value} (>= {limit})"))),
            AlertParameter::WaterTemp => band_level(self.thresholds.water_temp, value).map(|level| {
                let note = match level {
                    AlertLevel::Danger => "critical",
                    AlertLevel::Warning => "threshold",
                };
                (level, format!("Water Temp {value}°C ({note})"))
            }),
        }
    }
}

fn upper_level(limits: UpperLimits, value: f64) -> Option<(AlertLevel, f64)> {
    if value >= limits.danger {
        Some((AlertLevel::Danger, limits.danger))
    } else if value >= limits.warning {
        Some((AlertLevel::Warning, limits.warning))
    } else {
        None
    }
}

fn band_level(limits: BandLimits, value: f64) -> Option<AlertLevel> {
    if value <= limits.low_danger || value >= limits.high_danger {
        Some(AlertLevel::Danger)
    } else if value <= limits.low_warning || value >= limits.high_warning {
        Some(AlertLevel::Warning)
    } else {
        None
    }
}
