//! Shared data structures for bioreactor sensor ingestion
//!
//! - `SensorRecord`: one row of the sensor log
//! - `AlertKind` / `AlertEvent`: operational conditions raised per record
//! - `AlertThresholds`: the fixed policy values alerts are evaluated against

mod record;
mod alert;
pub mod thresholds;

pub use record::*;
pub use alert::*;
pub use thresholds::*;
