//! Alert thresholds for bioreactor monitoring

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Limits the alert evaluator compares each record against.
///
/// These are policy, not operator settings: they are built from
/// [`config::defaults`](crate::config::defaults) and never read from the
/// config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// O2 below this raises `O2Low` (ppm)
    pub o2_low: f64,
    /// O2 above this raises `O2High` (ppm)
    pub o2_high: f64,
    /// Cell density exactly equal to this raises `CellDensityReady` and sets the latch
    pub cell_density_ready: f64,
    /// Latched cell density below this raises `CellDensityDiscard`
    pub cell_density_discard: f64,
    /// CO2 above this raises `CO2High` (ppm)
    pub co2_high: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            o2_low: defaults::O2_LOW_PPM,
            o2_high: defaults::O2_HIGH_PPM,
            cell_density_ready: defaults::CELL_DENSITY_READY,
            cell_density_discard: defaults::CELL_DENSITY_DISCARD,
            co2_high: defaults::CO2_HIGH_PPM,
        }
    }
}
