//! Sensor record type

use serde::{Deserialize, Serialize};

/// One reading from the bioreactor sensor log.
///
/// Column order matches the source file:
/// `timestamp, cell_density, o2_level, co2_level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: f64,
    /// Cell density (OD units)
    pub cell_density: f64,
    /// Dissolved oxygen (ppm)
    pub o2_level: f64,
    /// Dissolved carbon dioxide (ppm)
    pub co2_level: f64,
}

impl SensorRecord {
    pub const fn new(timestamp: f64, cell_density: f64, o2_level: f64, co2_level: f64) -> Self {
        Self {
            timestamp,
            cell_density,
            o2_level,
            co2_level,
        }
    }

    /// Broker payload: the four fields comma-joined.
    ///
    /// Uses the shortest representation that parses back to the same `f64`,
    /// always carrying a decimal point or exponent (`1.0`, not `1`).
    pub fn to_message(&self) -> String {
        format!(
            "{:?},{:?},{:?},{:?}",
            self.timestamp, self.cell_density, self.o2_level, self.co2_level
        )
    }
}
