use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::core::RawRow;
use crate::error::{ClimboxError, ClimboxResult};
use crate::ingest::gviz::{gviz_url, parse_rows};
use crate::ingest::live::decode_rows;
use crate::ingest::locations::{Location, LocationRegistry, resolve_sheet_name};

/// Fetches a text document. Implementations must bypass intermediate caches.
pub trait TextFetcher {
    fn fetch_text(&self, url: &str) -> ClimboxResult<String>;
}

impl<F> TextFetcher for F
where
    F: Fn(&str) -> ClimboxResult<String>,
{
    fn fetch_text(&self, url: &str) -> ClimboxResult<String> {
        self(url)
    }
}

/// Supplies the history rows of one location.
pub trait RowSource {
    fn fetch_rows(&self, location: &Location) -> ClimboxResult<Vec<RawRow>>;
}

impl<F> RowSource for F
where
    F: Fn(&Location) -> ClimboxResult<Vec<RawRow>>,
{
    fn fetch_rows(&self, location: &Location) -> ClimboxResult<Vec<RawRow>> {
        self(location)
    }
}

/// History rows from the location's spreadsheet through the GViz endpoint.
#[derive(Debug, Clone)]
pub struct GvizRowSource<F> {
    fetcher: F,
    range: String,
    date_token: String,
    sheet_name: Option<String>,
    today: Option<NaiveDate>,
}

impl<F: TextFetcher> GvizRowSource<F> {
    #[must_use]
    pub fn new(fetcher: F, range: impl Into<String>, date_token: impl Into<String>) -> Self {
        Self {
            fetcher,
            range: range.into(),
            date_token: date_token.into(),
            sheet_name: None,
            today: None,
        }
    }

    /// Forces a sheet tab for every location.
    #[must_use]
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    /// Pins the date used for dated tab names; defaults to the current UTC date.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn sheet_name_for(&self, location: &Location) -> String {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        resolve_sheet_name(
            Some(location),
            self.sheet_name.as_deref(),
            &self.date_token,
            today,
        )
    }
}

impl<F: TextFetcher> RowSource for GvizRowSource<F> {
    fn fetch_rows(&self, location: &Location) -> ClimboxResult<Vec<RawRow>> {
        let sheet_id = location
            .sheet_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClimboxError::MissingSheetId(location.location_id.clone()))?;
        let sheet_name = self.sheet_name_for(location);
        let url = gviz_url(sheet_id, &sheet_name, &self.range)?;
        debug!(location = %location.location_id, sheet = %sheet_name, "fetching gviz history");
        let body = self.fetcher.fetch_text(&url)?;
        parse_rows(&body)
    }
}

/// Static JSON snapshots under `<base>/<location>/`.
///
/// `latest.json` either carries rows itself or points at a sheet snapshot
/// through its `sheetName` member. The location's own sheet name is tried
/// last.
#[derive(Debug, Clone)]
pub struct SnapshotRowSource<F> {
    fetcher: F,
    base_url: String,
}

impl<F: TextFetcher> SnapshotRowSource<F> {
    #[must_use]
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn snapshot_urls(&self, location: &Location) -> Vec<String> {
        let mut urls = vec![self.file_url(location, "latest")];
        if let Some(name) = location.sheet_name.as_deref().filter(|n| !n.is_empty()) {
            urls.push(self.file_url(location, name));
        }
        urls
    }

    fn file_url(&self, location: &Location, stem: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&location.location_id),
            urlencoding::encode(stem)
        )
    }

    fn fetch_snapshot(&self, url: &str) -> ClimboxResult<Vec<RawRow>> {
        let body = self.fetcher.fetch_text(url)?;
        decode_rows(body.as_bytes())
    }
}

/// `sheetName` of a pointer document, when present and non-blank.
fn pointer_sheet_name(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("sheetName")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

impl<F: TextFetcher> RowSource for SnapshotRowSource<F> {
    fn fetch_rows(&self, location: &Location) -> ClimboxResult<Vec<RawRow>> {
        let mut urls = self.snapshot_urls(location);
        let latest = urls.remove(0);
        let mut last_err = match self.fetcher.fetch_text(&latest) {
            Ok(body) => match decode_rows(body.as_bytes()) {
                Ok(rows) => return Ok(rows),
                Err(err) => {
                    if let Some(name) = pointer_sheet_name(&body) {
                        let pointed = self.file_url(location, &name);
                        debug!(url = %pointed, "latest.json points at sheet snapshot");
                        urls.retain(|url| *url != pointed);
                        urls.insert(0, pointed);
                    }
                    err
                }
            },
            Err(err) => err,
        };
        debug!(url = %latest, error = %last_err, "latest snapshot unusable");

        for url in urls {
            match self.fetch_snapshot(&url) {
                Ok(rows) => return Ok(rows),
                Err(err) => {
                    debug!(url = %url, error = %err, "snapshot unavailable");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

/// Uses `primary`, falling back to `secondary` when it fails or yields no rows.
#[derive(Debug, Clone)]
pub struct FallbackRowSource<P, S> {
    primary: P,
    secondary: S,
}

impl<P: RowSource, S: RowSource> FallbackRowSource<P, S> {
    #[must_use]
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: RowSource, S: RowSource> RowSource for FallbackRowSource<P, S> {
    fn fetch_rows(&self, location: &Location) -> ClimboxResult<Vec<RawRow>> {
        match self.primary.fetch_rows(location) {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => {
                debug!(location = %location.location_id, "primary source empty, trying fallback");
                self.secondary.fetch_rows(location)
            }
            Err(err) => {
                warn!(
                    location = %location.location_id,
                    error = %err,
                    "primary source failed, trying fallback"
                );
                self.secondary.fetch_rows(location)
            }
        }
    }
}

/// Loads the locations registry, degrading to an empty registry on failure.
pub fn fetch_locations<F: TextFetcher>(fetcher: &F, url: &str) -> LocationRegistry {
    match fetcher
        .fetch_text(url)
        .and_then(|body| LocationRegistry::from_json_str(&body))
    {
        Ok(registry) => {
            debug!(count = registry.len(), "loaded locations registry");
            registry
        }
        Err(err) => {
            warn!(url, error = %err, "locations registry unavailable");
            LocationRegistry::default()
        }
    }
}
