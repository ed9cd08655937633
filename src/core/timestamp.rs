use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;

/// Header candidates tried when a row's timestamp is not configured explicitly.
pub const DEFAULT_TIMESTAMP_CANDIDATES: [&str; 4] = ["Timestamp", "timestamp", "time", "date"];

/// Parses the timestamp shapes found in sheet and telemetry rows.
///
/// Recognized inputs:
/// - GViz literals `Date(y,m,d,h,mi[,s])` with a zero-based month
/// - RFC 3339 / ISO 8601 text, with or without offset
/// - epoch milliseconds as a JSON number
/// - `M/D/YYYY [H:M:S]` sheet text
///
/// Inputs without an explicit offset are read as wall-clock time in `local`.
#[must_use]
pub fn parse_timestamp(value: &Value, local: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(number) => {
            let millis = number.as_f64().filter(|n| n.is_finite())?;
            DateTime::<Utc>::from_timestamp_millis(millis as i64).map(|ts| ts.with_timezone(&local))
        }
        Value::String(text) => parse_timestamp_text(text.trim(), local),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str, local: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if text.is_empty() {
        return None;
    }
    if let Some(naive) = parse_gviz_date_literal(text) {
        return local.from_local_datetime(&naive).single();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&local));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return local.from_local_datetime(&naive).single();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        // Date-only ISO text is midnight UTC.
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive).with_timezone(&local));
    }
    parse_slash_date(text).and_then(|naive| local.from_local_datetime(&naive).single())
}

/// Parses `Date(2024,0,15,10,30[,5])`; the month is zero-based.
#[must_use]
pub fn parse_gviz_date_literal(text: &str) -> Option<NaiveDateTime> {
    let inner = text.trim().strip_prefix("Date(")?.strip_suffix(')')?;
    let parts: Vec<u32> = inner
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() < 3 {
        return None;
    }
    let year = i32::try_from(parts[0]).ok()?;
    let date = NaiveDate::from_ymd_opt(year, parts[1].checked_add(1)?, parts[2])?;
    let hour = parts.get(3).copied().unwrap_or(0);
    let minute = parts.get(4).copied().unwrap_or(0);
    let second = parts.get(5).copied().unwrap_or(0);
    date.and_hms_opt(hour, minute, second)
}

fn parse_slash_date(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let date_part = parts.next()?;
    let fields: Vec<&str> = date_part.split('/').collect();
    if fields.len() != 3 {
        return None;
    }
    let month: u32 = fields[0].parse().ok()?;
    let day: u32 = fields[1].parse().ok()?;
    let year: i32 = fields[2].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let mut clock = [0u32; 3];
    if let Some(time_part) = parts.next() {
        for (slot, piece) in clock.iter_mut().zip(time_part.split(':')) {
            *slot = piece.parse().unwrap_or(0);
        }
    }
    date.and_hms_opt(clock[0], clock[1], clock[2])
}

/// `HH:MM` chart label, empty when the timestamp is unusable.
#[must_use]
pub fn chart_label(value: Option<&Value>, local: FixedOffset) -> String {
    value
        .and_then(|v| parse_timestamp(v, local))
        .map(|ts| ts.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// `DD Mon: HH:MM` alert time text; unparseable values are echoed verbatim.
#[must_use]
pub fn alert_time_text(value: Option<&Value>, local: FixedOffset) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match parse_timestamp(value, local) {
        Some(ts) => ts.format("%d %b: %H:%M").to_string(),
        None => match value {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}

/// Builds a fixed offset from minutes east of UTC, falling back to UTC.
#[must_use]
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}
