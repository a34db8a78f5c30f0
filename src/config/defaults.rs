//! System-wide default constants.
//!
//! Policy values (alert thresholds, queue names, publish channel) live here
//! and are copied into [`IngestPolicy`](super::IngestPolicy) at startup.
//! Runtime defaults for [`ProducerConfig`](super::ProducerConfig) sit alongside.

// ============================================================================
// Alert Policy
// ============================================================================

/// Dissolved O2 below this is flagged (ppm).
pub const O2_LOW_PPM: f64 = 38.0;

/// Dissolved O2 above this is flagged (ppm).
pub const O2_HIGH_PPM: f64 = 41.0;

/// Cell density at which the culture is ready to harvest.
///
/// Compared with exact `f64` equality.
pub const CELL_DENSITY_READY: f64 = 2.0;

/// After reaching the ready level, density below this means discard.
pub const CELL_DENSITY_DISCARD: f64 = 1.7;

/// Dissolved CO2 above this is flagged (ppm).
pub const CO2_HIGH_PPM: f64 = 17.0;

// ============================================================================
// Broker Topology
// ============================================================================

/// Durable queues reset at startup: cell density, O2, CO2.
pub const QUEUE_NAMES: [&str; 3] = ["cell-density", "o2-levels", "co2-levels"];

/// Routing key every record is published under (default exchange).
///
/// Differs from all of [`QUEUE_NAMES`].
pub const PUBLISH_CHANNEL: &str = "Cell_Data";

// ============================================================================
// Runtime Defaults
// ============================================================================

/// Sensor log read when nothing else is configured.
pub const INPUT_FILE: &str = "Cell_Data.csv";

/// Delay after each record (ms). 1 000 = one reading per second.
pub const PACING_MS: u64 = 1_000;

/// Upper bound accepted for `input.pacing_ms` (one hour).
pub const MAX_PACING_MS: u64 = 3_600_000;

/// Persistent log sink, truncated at every start.
pub const LOG_FILE: &str = "Cell-Data.log";

/// Default tracing filter when `RUST_LOG` is unset.
pub const LOG_LEVEL: &str = "info";

pub const BROKER_HOST: &str = "localhost";

/// RabbitMQ management plugin port (HTTP API and admin UI).
pub const BROKER_MANAGEMENT_PORT: u16 = 15_672;

pub const BROKER_USERNAME: &str = "guest";

pub const BROKER_PASSWORD: &str = "guest";

pub const BROKER_VHOST: &str = "/";

/// HTTP timeout for each management API request (seconds).
pub const BROKER_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Admin console page offered at startup.
pub const ADMIN_URL: &str = "http://localhost:15672/#/queues";

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "cellstream.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CELLSTREAM_CONFIG";
