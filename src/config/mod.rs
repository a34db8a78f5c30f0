//! Producer Configuration Module
//!
//! Two layers:
//!
//! - [`ProducerConfig`]: runtime settings (input file, broker, logging,
//!   admin console) loaded from TOML with CLI overrides.
//! - [`IngestPolicy`]: the immutable policy handed to the ingest loop
//!   (alert thresholds, queue names, publish channel, pacing). Thresholds
//!   and topology come from [`defaults`] only.
//!
//! ## Loading Order
//!
//! 1. Explicit path (`--config`)
//! 2. `CELLSTREAM_CONFIG` environment variable (path to TOML file)
//! 3. `cellstream.toml` in the current working directory
//! 4. Built-in defaults
//!
//! Nothing is stored globally: `main` builds both values once and passes
//! them down.

mod producer_config;
mod policy;
pub mod defaults;

pub use producer_config::*;
pub use policy::IngestPolicy;
