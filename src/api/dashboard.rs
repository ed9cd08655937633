use chrono::Utc;
use tracing::{debug, warn};

use crate::api::cache::{CacheEntry, CacheStore, cache_key, read_entry, write_entry};
use crate::api::cards::{CardView, GroupedReading, build_cards, group_row};
use crate::api::charts::{ChartSeriesSet, prepare_chart_series};
use crate::api::config::ClimboxConfig;
use crate::core::RawRow;
use crate::ingest::LiveMessage;

/// Card content derived from the latest row of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CardsUpdate {
    pub location_id: String,
    pub grouped: GroupedReading,
    pub cards: Vec<CardView>,
}

/// Per-location dashboard state: renders cards and charts and keeps the
/// local snapshot cache current.
///
/// History polls and live messages both go through [`Dashboard::ingest_rows`];
/// whichever arrives last wins.
#[derive(Debug)]
pub struct Dashboard<C> {
    config: ClimboxConfig,
    cache: C,
}

impl<C: CacheStore> Dashboard<C> {
    #[must_use]
    pub fn new(config: ClimboxConfig, cache: C) -> Self {
        Self { config, cache }
    }

    #[must_use]
    pub fn config(&self) -> &ClimboxConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Groups the last row into cards and caches the batch.
    ///
    /// Returns `None` for an empty batch, leaving the cache untouched.
    pub fn ingest_rows(&mut self, location_id: &str, rows: Vec<RawRow>) -> Option<CardsUpdate> {
        let last = rows.last()?;
        let grouped = group_row(last, &self.config);
        let cards = build_cards(&grouped, &self.config);

        let entry = CacheEntry {
            fetched_at: Utc::now(),
            last_timestamp: grouped.timestamp.clone(),
            raw: rows,
            grouped: grouped.clone(),
        };
        write_entry(
            &mut self.cache,
            &cache_key(&self.config.cache_prefix, location_id),
            &entry,
        );
        debug!(location = location_id, rows = entry.raw.len(), "dashboard cards updated");

        Some(CardsUpdate {
            location_id: location_id.to_owned(),
            grouped,
            cards,
        })
    }

    /// Chart series for a history batch, followed by the card update.
    pub fn ingest_history(
        &mut self,
        location_id: &str,
        rows: Vec<RawRow>,
    ) -> (Option<ChartSeriesSet>, Option<CardsUpdate>) {
        let charts = prepare_chart_series(&rows, &self.config);
        (charts, self.ingest_rows(location_id, rows))
    }

    /// Applies a live message to the configured location's cards.
    ///
    /// Messages for other locations or without rows are ignored.
    pub fn ingest_live(&mut self, message: &LiveMessage) -> Option<CardsUpdate> {
        let target = message
            .location_id
            .as_deref()
            .unwrap_or(&self.config.location_id)
            .to_owned();
        if target != self.config.location_id {
            debug!(topic = %message.topic, location = %target, "ignoring message for another location");
            return None;
        }
        if message.rows.is_empty() {
            warn!(topic = %message.topic, "live message with no usable rows");
            return None;
        }
        self.ingest_rows(&target, message.rows.clone())
    }

    /// Cached snapshot used to paint the dashboard before the first fetch completes.
    #[must_use]
    pub fn cached(&self, location_id: &str) -> Option<CacheEntry> {
        read_entry(&self.cache, &cache_key(&self.config.cache_prefix, location_id))
    }
}
