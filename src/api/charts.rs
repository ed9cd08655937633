use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::config::ClimboxConfig;
use crate::core::{FieldResolver, RawRow, as_number, chart_label};

/// Canonical keys of the climate chart (full history window).
pub const CLIMATE_KEYS: [&str; 2] = ["humidity", "air_temp"];
/// Canonical keys of the water-quality chart.
pub const WATER_QUALITY_KEYS: [&str; 3] = ["water_temp", "tss", "ph"];
/// Canonical keys of the water-chemistry chart.
pub const CHEMISTRY_KEYS: [&str; 3] = ["do", "ec", "tds"];
/// Points kept by the sparse water charts.
pub const SPARSE_CHART_POINTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Labels plus one aligned value list per series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPanel {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartPanel {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn series(&self, key: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.key == key)
    }

    /// Smallest and largest value across all series, ignoring gaps.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values = || {
            self.series
                .iter()
                .flat_map(|s| s.values.iter().flatten())
                .map(|v| OrderedFloat(*v))
        };
        let min = values().min()?;
        let max = values().max()?;
        Some((min.into_inner(), max.into_inner()))
    }
}

/// The three dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesSet {
    pub climate: ChartPanel,
    pub water_quality: ChartPanel,
    pub chemistry: ChartPanel,
}

/// Builds chart arrays from history rows; `None` when there are no rows.
///
/// The climate chart takes the last `HISTORY_POINTS` rows. The water charts
/// keep only rows where at least one of their keys is numeric, then take the
/// last [`SPARSE_CHART_POINTS`] of those.
#[must_use]
pub fn prepare_chart_series(rows: &[RawRow], config: &ClimboxConfig) -> Option<ChartSeriesSet> {
    if rows.is_empty() {
        return None;
    }
    let builder = PanelBuilder::new(config);

    let climate_rows: Vec<&RawRow> = tail(rows, config.history_points).iter().collect();
    let climate = builder.panel(&climate_rows, &CLIMATE_KEYS);

    let water_rows = builder.numeric_rows(rows, &WATER_QUALITY_KEYS, SPARSE_CHART_POINTS);
    let water_quality = builder.panel(&water_rows, &WATER_QUALITY_KEYS);

    let chemistry_rows = builder.numeric_rows(rows, &CHEMISTRY_KEYS, SPARSE_CHART_POINTS);
    let chemistry = builder.panel(&chemistry_rows, &CHEMISTRY_KEYS);

    trace!(
        climate = climate.len(),
        water_quality = water_quality.len(),
        chemistry = chemistry.len(),
        "prepared chart series"
    );
    Some(ChartSeriesSet {
        climate,
        water_quality,
        chemistry,
    })
}

fn tail<T>(items: &[T], count: usize) -> &[T] {
    &items[items.len().saturating_sub(count.max(1))..]
}

struct PanelBuilder<'c> {
    config: &'c ClimboxConfig,
    resolver: FieldResolver,
    timestamp_candidates: Vec<String>,
}

impl<'c> PanelBuilder<'c> {
    fn new(config: &'c ClimboxConfig) -> Self {
        Self {
            config,
            resolver: config.resolver(),
            timestamp_candidates: config.timestamp_candidates(),
        }
    }

    fn number(&self, row: &RawRow, key: &str) -> Option<f64> {
        as_number(self.resolver.pick_canonical(row, key).value())
    }

    fn numeric_rows<'r>(&self, rows: &'r [RawRow], keys: &[&str], limit: usize) -> Vec<&'r RawRow> {
        let matching: Vec<&RawRow> = rows
            .iter()
            .filter(|row| keys.iter().any(|key| self.number(row, key).is_some()))
            .collect();
        tail(&matching, limit).to_vec()
    }

    fn panel(&self, rows: &[&RawRow], keys: &[&str]) -> ChartPanel {
        let offset = self.config.station_offset();
        let labels = rows
            .iter()
            .map(|row| chart_label(self.resolver.pick(row, &self.timestamp_candidates).value(), offset))
            .collect();
        let series = keys
            .iter()
            .map(|key| ChartSeries {
                key: (*key).to_owned(),
                values: rows.iter().map(|row| self.number(row, key)).collect(),
            })
            .collect();
        ChartPanel { labels, series }
    }
}
