use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::alerts::dedupe::AlertDeduplicator;
use crate::alerts::evaluator::{Alert, AlertEvaluator, AlertLevel};
use crate::api::ClimboxConfig;
use crate::error::ClimboxResult;
use crate::ingest::{Location, RowSource};

/// Outcome of one evaluation pass over every location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertCycle {
    /// Alerts that passed deduplication, in location order.
    pub alerts: Vec<Alert>,
    /// Locations whose rows could not be fetched.
    pub failed_locations: Vec<String>,
    /// Locations that returned no rows.
    pub empty_locations: Vec<String>,
}

impl AlertCycle {
    /// Newest first, at most `max_items`.
    ///
    /// Alerts with a parsed timestamp sort by it; the rest follow, ordered by
    /// their time text.
    #[must_use]
    pub fn feed(&self, max_items: usize) -> Vec<&Alert> {
        let mut feed: Vec<&Alert> = self.alerts.iter().collect();
        feed.sort_by(|a, b| newest_first(a, b));
        feed.truncate(max_items);
        feed
    }

    /// Danger alerts, for toast-style surfacing.
    #[must_use]
    pub fn dangers(&self) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|alert| alert.level == AlertLevel::Danger)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

fn newest_first(a: &Alert, b: &Alert) -> Ordering {
    let by_time = match (a.observed_at, b.observed_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.time_text.cmp(&a.time_text),
    };
    by_time.then_with(|| b.level.cmp(&a.level))
}

/// Evaluates every location's latest row and deduplicates the results.
///
/// Dedupe state persists across cycles for the monitor's lifetime.
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    evaluator: AlertEvaluator,
    dedupe: AlertDeduplicator,
}

impl AlertMonitor {
    #[must_use]
    pub fn new(evaluator: AlertEvaluator, dedupe: AlertDeduplicator) -> Self {
        Self { evaluator, dedupe }
    }

    pub fn from_config(config: &ClimboxConfig) -> ClimboxResult<Self> {
        Ok(Self::new(
            AlertEvaluator::from_config(config)?,
            config.deduplicator(),
        ))
    }

    #[must_use]
    pub fn evaluator(&self) -> &AlertEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn dedupe(&self) -> &AlertDeduplicator {
        &self.dedupe
    }

    /// Runs one pass. A failing location is logged and skipped; it never
    /// aborts the pass.
    pub fn evaluate_all_once<S>(&mut self, source: &S, locations: &[Location]) -> AlertCycle
    where
        S: RowSource + ?Sized,
    {
        let mut cycle = AlertCycle::default();
        for location in locations {
            let rows = match source.fetch_rows(location) {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(location = %location.location_id, error = %err, "alert source failed");
                    cycle.failed_locations.push(location.location_id.clone());
                    continue;
                }
            };
            let Some(last) = rows.last() else {
                debug!(location = %location.location_id, "no rows to evaluate");
                cycle.empty_locations.push(location.location_id.clone());
                continue;
            };
            for alert in self.evaluator.evaluate(location, last) {
                if self.dedupe.admit(&alert) {
                    cycle.alerts.push(alert);
                }
            }
        }
        if !cycle.alerts.is_empty() {
            info!(
                alerts = cycle.alerts.len(),
                dangers = cycle.dangers().len(),
                "alert cycle produced new alerts"
            );
        }
        cycle
    }
}
