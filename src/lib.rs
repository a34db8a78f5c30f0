//! cellstream: Bioreactor Sensor Relay
//!
//! Replays a time-ordered bioreactor sensor log onto a message broker and
//! flags operationally significant readings as they pass.
//!
//! ## Architecture
//!
//! - **Acquisition**: row parsing for the sensor log
//! - **Pipeline**: record sources, dedup gate, alert evaluator, ingest loop
//! - **Broker**: publisher traits, RabbitMQ management adapter, in-memory broker
//! - **Config**: runtime settings (TOML) and the immutable ingest policy

pub mod acquisition;
pub mod admin;
pub mod broker;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{IngestPolicy, ProducerConfig};

// Re-export commonly used types
pub use types::{AlertEvent, AlertKind, AlertThresholds, SensorRecord};

// Re-export pipeline entry points
pub use pipeline::{
    run_session, AlertEvaluator, CsvRecordSource, IngestLoop, IngestOutcome, IngestReport,
    IngestState, RecordHooks, RecordSource, ReplaySource,
};

// Re-export brokers
pub use broker::{Broker, ManagementBroker, MemoryBroker, Publisher};
