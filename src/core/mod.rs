pub mod coerce;
pub mod field_key;
pub mod resolver;
pub mod row;
pub mod timestamp;

pub use coerce::{
    PLACEHOLDER, as_boolean, as_number, display_text, format_number, format_optional, is_blank,
    numeric_or_raw, round2,
};
pub use field_key::{NormalizedKey, normalize_key, normalize_value};
pub use resolver::{AliasSet, FieldMatch, FieldResolver};
pub use row::RawRow;
pub use timestamp::{
    DEFAULT_TIMESTAMP_CANDIDATES, alert_time_text, chart_label, offset_from_minutes,
    parse_gviz_date_literal, parse_timestamp,
};
