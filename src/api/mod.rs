//! Dashboard-facing API: configuration, chart series, cards and the local cache.

pub mod cache;
pub mod cards;
pub mod charts;
pub mod config;
pub mod dashboard;

pub use cache::{CacheEntry, CacheStore, MemoryCacheStore, cache_key, read_entry, write_entry};
pub use cards::{
    ARROW_END_DEG, ARROW_START_DEG, CardField, CardGroup, CardView, GroupedReading, build_cards,
    gauge_angle, group_row,
};
pub use charts::{
    CHEMISTRY_KEYS, CLIMATE_KEYS, ChartPanel, ChartSeries, ChartSeriesSet, SPARSE_CHART_POINTS,
    WATER_QUALITY_KEYS, prepare_chart_series,
};
pub use config::{AlertConfig, ArrowRange, ClimboxConfig, MqttConfig, deep_merge};
pub use dashboard::{CardsUpdate, Dashboard};
