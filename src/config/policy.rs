//! Immutable ingest policy

use std::time::Duration;

use super::{defaults, ProducerConfig};
use crate::types::AlertThresholds;

/// Fixed policy for one ingest run.
///
/// Built once before the loop starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestPolicy {
    pub thresholds: AlertThresholds,
    /// Queues deleted and re-declared durable at startup
    pub queues: Vec<String>,
    /// Routing key every accepted record is published under
    pub publish_channel: String,
    /// Delay applied after each record
    pub pacing: Duration,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
            queues: defaults::QUEUE_NAMES.iter().map(ToString::to_string).collect(),
            publish_channel: defaults::PUBLISH_CHANNEL.to_string(),
            pacing: Duration::from_millis(defaults::PACING_MS),
        }
    }
}

impl IngestPolicy {
    /// Policy for a run configured by `config`: default thresholds and
    /// topology, pacing from `input.pacing_ms`.
    pub fn from_config(config: &ProducerConfig) -> Self {
        Self {
            pacing: Duration::from_millis(config.input.pacing_ms),
            ..Self::default()
        }
    }

    /// Same policy with a different pacing delay.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_topology() {
        let policy = IngestPolicy::default();
        assert_eq!(policy.queues, vec!["cell-density", "o2-levels", "co2-levels"]);
        assert_eq!(policy.publish_channel, "Cell_Data");
        assert!(!policy.queues.contains(&policy.publish_channel));
        assert_eq!(policy.pacing, Duration::from_secs(1));
    }

    #[test]
    fn test_pacing_follows_config() {
        let mut config = ProducerConfig::default();
        config.input.pacing_ms = 0;
        let policy = IngestPolicy::from_config(&config);
        assert_eq!(policy.pacing, Duration::ZERO);
        assert_eq!(policy.thresholds, AlertThresholds::default());
    }
}
