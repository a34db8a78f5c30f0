//! Sensor Log Row Parser
//!
//! Each data row carries four numeric columns:
//!
//! ```text
//! timestamp,cell_density,o2_level,co2_level
//! 1.0,1.2,39.5,12.0
//! ```
//!
//! Columns past the fourth are ignored. Fields are trimmed before parsing,
//! and double-quoted fields may contain commas.

use crate::types::SensorRecord;
use thiserror::Error;

/// Number of leading columns that make up a record.
pub const RECORD_FIELDS: usize = 4;

/// Column names in file order, used in error messages.
const FIELD_NAMES: [&str; RECORD_FIELDS] = ["timestamp", "cell_density", "o2_level", "co2_level"];

/// Why a row could not become a [`SensorRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    TooFewFields { found: usize },
    NotNumeric { field: &'static str, value: String },
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields { found } => {
                write!(f, "expected {RECORD_FIELDS} fields, found {found}")
            }
            Self::NotNumeric { field, value } => {
                write!(f, "{field} is not a number: {value:?}")
            }
        }
    }
}

/// A data row that failed to parse. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record on line {line}: {reason}")]
pub struct MalformedRecord {
    /// 1-based line in the source file (header is line 1)
    pub line: usize,
    pub reason: MalformedReason,
}

/// Parse one data row into a record.
pub fn parse_row(row: &str, line: usize) -> Result<SensorRecord, MalformedRecord> {
    let fields = split_fields(row);
    if fields.len() < RECORD_FIELDS {
        return Err(MalformedRecord {
            line,
            reason: MalformedReason::TooFewFields { found: fields.len() },
        });
    }

    let mut values = [0.0_f64; RECORD_FIELDS];
    for (i, slot) in values.iter_mut().enumerate() {
        let raw = fields[i].trim();
        *slot = raw.parse::<f64>().map_err(|_| MalformedRecord {
            line,
            reason: MalformedReason::NotNumeric {
                field: FIELD_NAMES[i],
                value: raw.to_string(),
            },
        })?;
    }

    let [timestamp, cell_density, o2_level, co2_level] = values;
    Ok(SensorRecord::new(timestamp, cell_density, o2_level, co2_level))
}

/// Split a row on commas, honouring double quotes (`""` is an escaped quote).
///
/// An empty row yields no fields.
fn split_fields(row: &str) -> Vec<String> {
    if row.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
