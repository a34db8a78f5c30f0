//! Alert evaluator.
//!
//! Five independent checks run on every record, in this order:
//!
//! | Check                                  | Alert                | Latch  |
//! |----------------------------------------|----------------------|--------|
//! | `o2 < o2_low`                          | `O2Low`              |        |
//! | `o2 > o2_high`                         | `O2High`             |        |
//! | `density == ready` (exact)             | `CellDensityReady`   | set    |
//! | `co2 > co2_high`                       | `CO2High`            |        |
//! | latched and `density < discard`        | `CellDensityDiscard` | clear  |
//!
//! The latch makes the density alerts a two-state machine: Normal goes to
//! Ready on an exact ready reading, Ready goes back to Normal on the first
//! reading below the discard level. Readings between the two levels are
//! silent.

use super::IngestState;
use crate::types::{AlertEvent, AlertKind, AlertThresholds, SensorRecord};

/// Alerts raised by one record and the state to carry forward.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub alerts: Vec<AlertEvent>,
    pub state: IngestState,
}

impl Evaluation {
    pub fn kinds(&self) -> Vec<AlertKind> {
        self.alerts.iter().map(|a| a.kind).collect()
    }
}

/// Pure mapping of (record, state) to (alerts, state).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub const fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate one record. Only the latch in the returned state can differ
    /// from `state`.
    #[allow(clippy::float_cmp)]
    pub fn evaluate(&self, record: &SensorRecord, state: &IngestState) -> Evaluation {
        let t = &self.thresholds;
        let mut next = *state;
        let mut alerts = Vec::new();

        if record.o2_level < t.o2_low {
            alerts.push(AlertEvent::new(AlertKind::O2Low, record.o2_level, t.o2_low));
        }
        if record.o2_level > t.o2_high {
            alerts.push(AlertEvent::new(AlertKind::O2High, record.o2_level, t.o2_high));
        }
        if record.cell_density == t.cell_density_ready {
            alerts.push(AlertEvent::new(
                AlertKind::CellDensityReady,
                record.cell_density,
                t.cell_density_ready,
            ));
            next.cell_density_high_latch = true;
        }
        if record.co2_level > t.co2_high {
            alerts.push(AlertEvent::new(AlertKind::CO2High, record.co2_level, t.co2_high));
        }
        if next.cell_density_high_latch && record.cell_density < t.cell_density_discard {
            alerts.push(AlertEvent::new(
                AlertKind::CellDensityDiscard,
                record.cell_density,
                t.cell_density_discard,
            ));
            next.cell_density_high_latch = false;
        }

        Evaluation {
            alerts,
            state: next,
        }
    }
}
