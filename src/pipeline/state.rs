//! Ingest state carried from one record to the next.

use serde::{Deserialize, Serialize};

/// Bounded state owned by the ingest loop for one run.
///
/// Never persisted: a restart begins from [`IngestState::default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestState {
    /// Timestamp of the most recently published record
    pub last_timestamp: Option<f64>,
    /// Set when cell density hits the ready level; cleared by the discard alert
    pub cell_density_high_latch: bool,
}

impl IngestState {
    pub const fn new() -> Self {
        Self {
            last_timestamp: None,
            cell_density_high_latch: false,
        }
    }
}
