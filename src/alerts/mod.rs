//! Threshold alerting: evaluation, deduplication and the polling monitor.

pub mod dedupe;
pub mod evaluator;
pub mod monitor;
pub mod poll;
pub mod thresholds;

pub use dedupe::{AlertDeduplicator, AlertKey};
pub use evaluator::{Alert, AlertEvaluator, AlertLevel, AlertParameter};
pub use monitor::{AlertCycle, AlertMonitor};
pub use poll::{PollHandle, PollLoop};
pub use thresholds::{BandLimits, Thresholds, UpperLimits};
