//! climbox: data plumbing for the Climbox environmental-sensor network.
//!
//! Spreadsheet history (GViz) and live telemetry rows arrive with
//! uncontrolled header text. The field resolution engine in [`core`] maps
//! those headers onto canonical sensor fields; [`api`] turns the resolved
//! readings into chart series and card view models, [`alerts`] evaluates
//! thresholds across locations, and [`profile`] models accounts and
//! notification preferences.

pub mod alerts;
pub mod api;
pub mod core;
pub mod error;
pub mod ingest;
pub mod profile;
pub mod telemetry;

pub use crate::api::{ClimboxConfig, Dashboard};
pub use crate::core::{FieldMatch, FieldResolver, RawRow, normalize_key};
pub use crate::error::{ClimboxError, ClimboxResult};
