//! Data sources: GViz history, live telemetry payloads and the locations registry.

pub mod gviz;
#[cfg(feature = "http")]
pub mod http;
pub mod live;
pub mod locations;
pub mod source;

pub use gviz::{GvizTable, gviz_url, parse_rows, unwrap_response};
#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use live::{
    LiveMessage, LiveSummary, LiveTemperatures, decode_rows, list_topics, location_topic,
};
pub use locations::{Location, LocationRegistry, resolve_sheet_name};
pub use source::{
    FallbackRowSource, GvizRowSource, RowSource, SnapshotRowSource, TextFetcher, fetch_locations,
};
