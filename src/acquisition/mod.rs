//! Sensor data acquisition module
//!
//! Row-level parsing of the bioreactor sensor log.

pub mod csv_row;

pub use csv_row::{parse_row, MalformedReason, MalformedRecord};
