//! Google Visualization (GViz) history responses.
//!
//! The endpoint answers with JSON wrapped in a JavaScript callback:
//! `google.visualization.Query.setResponse({...});`, usually preceded by an
//! anti-hijacking comment. Sheets that are not public answer with an HTML
//! login page instead.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::RawRow;
use crate::error::{ClimboxError, ClimboxResult};

pub const GVIZ_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
const GVIZ_CALLBACK: &str = "google.visualization.Query.setResponse(";

/// Builds the GViz query URL for a sheet tab and cell range.
pub fn gviz_url(sheet_id: &str, sheet_name: &str, range: &str) -> ClimboxResult<String> {
    if sheet_id.trim().is_empty() {
        return Err(ClimboxError::InvalidData("sheet id missing".to_owned()));
    }
    Ok(format!(
        "{GVIZ_BASE_URL}/{}/gviz/tq?sheet={}&range={}&tqx=out:json",
        urlencoding::encode(sheet_id),
        urlencoding::encode(sheet_name),
        urlencoding::encode(range),
    ))
}

/// Strips the callback envelope and parses the JSON payload.
pub fn unwrap_response(text: &str) -> ClimboxResult<Value> {
    let trimmed = text.trim();
    if trimmed.starts_with('<') {
        return Err(ClimboxError::GvizHtml);
    }
    let start = trimmed
        .find(GVIZ_CALLBACK)
        .ok_or_else(|| ClimboxError::GvizEnvelope("missing setResponse callback".to_owned()))?;
    let body = &trimmed[start + GVIZ_CALLBACK.len()..];
    let body = body.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let body = body
        .strip_suffix(')')
        .ok_or_else(|| ClimboxError::GvizEnvelope("unterminated setResponse callback".to_owned()))?;
    if body.trim().is_empty() {
        return Err(ClimboxError::GvizEnvelope("empty setResponse payload".to_owned()));
    }
    serde_json::from_str(body)
        .map_err(|e| ClimboxError::GvizEnvelope(format!("payload is not valid json: {e}")))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub table: Option<GvizTable>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub cols: Vec<GvizColumn>,
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizColumn {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl GvizColumn {
    fn header(&self, index: usize) -> String {
        [self.label.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map_or_else(|| format!("col_{index}"), str::to_owned)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl GvizCell {
    /// Raw value when present, else the formatted text.
    fn value(&self) -> Value {
        match (&self.v, &self.f) {
            (Some(v), _) if !v.is_null() => v.clone(),
            (_, Some(f)) => Value::String(f.clone()),
            _ => Value::Null,
        }
    }
}

impl GvizTable {
    /// Converts the table into rows keyed by column label (or id, or `col_<i>`).
    #[must_use]
    pub fn to_rows(&self) -> Vec<RawRow> {
        let headers: Vec<String> = self
            .cols
            .iter()
            .enumerate()
            .map(|(i, col)| col.header(i))
            .collect();

        self.rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let value = row
                            .c
                            .get(i)
                            .and_then(Option::as_ref)
                            .map_or(Value::Null, GvizCell::value);
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Parses a raw GViz response body into rows.
///
/// A response without a table yields no rows; an explicit error status is
/// reported as an envelope error.
pub fn parse_rows(text: &str) -> ClimboxResult<Vec<RawRow>> {
    let payload = unwrap_response(text)?;
    let response: GvizResponse = serde_json::from_value(payload)
        .map_err(|e| ClimboxError::GvizEnvelope(format!("unexpected response shape: {e}")))?;

    if response.status.as_deref() == Some("error") {
        warn!(errors = ?response.errors, "gviz query reported an error");
        return Err(ClimboxError::GvizEnvelope(format!(
            "query failed: {}",
            Value::Array(response.errors)
        )));
    }

    let rows = response.table.as_ref().map(GvizTable::to_rows).unwrap_or_default();
    debug!(rows = rows.len(), "parsed gviz table");
    Ok(rows)
}
