use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ClimboxError, ClimboxResult};

/// One monitored site from the locations registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(alias = "id")]
    pub location_id: String,
    #[serde(default, alias = "displayName")]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,
}

impl Location {
    #[must_use]
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            name: None,
            country: None,
            sheet_id: None,
            sheet_name: None,
            lat: None,
            lng: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet_id: impl Into<String>, sheet_name: Option<String>) -> Self {
        self.sheet_id = Some(sheet_id.into());
        self.sheet_name = sheet_name;
        self
    }

    /// Name shown to users; falls back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.location_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Parses the registry document, a JSON array of locations.
    pub fn from_json_str(input: &str) -> ClimboxResult<Self> {
        let locations: Vec<Location> = serde_json::from_str(input).map_err(|e| {
            ClimboxError::InvalidData(format!("failed to parse locations registry: {e}"))
        })?;
        Ok(Self { locations })
    }

    #[must_use]
    pub fn find(&self, location_id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.location_id == location_id)
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Resolves the sheet tab holding a location's data for `today`.
///
/// Order: an explicit name (a bare `YYYY-MM-DD` becomes `data_<date>`), a
/// mapped name containing `date_token`, a mapped `data_<date>` name (rolled
/// forward to today), any other mapped name, then `data_<today>`.
#[must_use]
pub fn resolve_sheet_name(
    mapping: Option<&Location>,
    explicit: Option<&str>,
    date_token: &str,
    today: NaiveDate,
) -> String {
    let today_text = today.format("%Y-%m-%d").to_string();
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        if is_iso_date(explicit) {
            return format!("data_{explicit}");
        }
        return explicit.to_owned();
    }

    let mapped = mapping
        .and_then(|m| m.sheet_name.as_deref())
        .unwrap_or_default();
    if !date_token.is_empty() && mapped.contains(date_token) {
        return mapped.replacen(date_token, &today_text, 1);
    }
    if mapped.strip_prefix("data_").is_some_and(is_iso_date) {
        return format!("data_{today_text}");
    }
    if mapped.is_empty() {
        format!("data_{today_text}")
    } else {
        mapped.to_owned()
    }
}

fn is_iso_date(text: &str) -> bool {
    text.len() == 10 && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}
