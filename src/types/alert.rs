//! Alert types raised by the alert evaluator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of conditions the evaluator can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertKind {
    O2Low,
    O2High,
    CellDensityReady,
    CO2High,
    CellDensityDiscard,
}

impl AlertKind {
    /// All kinds in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::O2Low,
        Self::O2High,
        Self::CellDensityReady,
        Self::CO2High,
        Self::CellDensityDiscard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::O2Low => "O2Low",
            Self::O2High => "O2High",
            Self::CellDensityReady => "CellDensityReady",
            Self::CO2High => "CO2High",
            Self::CellDensityDiscard => "CellDensityDiscard",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alert raised by one record.
///
/// `value` is the reading that triggered it and `threshold` the limit it was
/// compared against. For `CellDensityDiscard` the threshold is the discard
/// limit, not the ready level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub value: f64,
    pub threshold: f64,
}

impl AlertEvent {
    pub const fn new(kind: AlertKind, value: f64, threshold: f64) -> Self {
        Self {
            kind,
            value,
            threshold,
        }
    }
}

impl fmt::Display for AlertEvent {
    /// Operator-facing notice written to the log sink.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AlertKind::O2Low => write!(
                f,
                "Alert: O2 levels are less than {} ppm. Check O2 system.",
                self.threshold
            ),
            AlertKind::O2High => write!(
                f,
                "Alert: O2 levels are greater than {} ppm. Check O2 system.",
                self.threshold
            ),
            AlertKind::CellDensityReady => write!(
                f,
                "Alert: Cell Density is = {:?}. Remove from Incubator. Cells are ready to be used.",
                self.threshold
            ),
            AlertKind::CO2High => write!(
                f,
                "Alert: CO2 levels are > {} ppm. CO2 levels rising to dangerous levels.",
                self.threshold
            ),
            AlertKind::CellDensityDiscard => write!(
                f,
                "Alert: Cell Density dropped below {} after reaching the ready level. Discard cells.",
                self.threshold
            ),
        }
    }
}
