//! How an ingest run ended, and what it did along the way.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use super::source::SourceError;
use crate::broker::{BrokerError, PublishError};
use crate::types::AlertKind;

/// Fatal conditions. None are retried.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Queue provisioning failed: {0}")]
    Provision(#[from] BrokerError),
}

/// Terminal state of the ingest loop.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Source exhausted.
    Completed,
    /// External interrupt observed between records.
    Cancelled,
    /// Malformed record, read failure, publish failure or provisioning failure.
    Failed(IngestError),
}

impl IngestOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Counters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Records pulled from the source
    pub records_read: u64,
    /// Records published to the broker
    pub records_published: u64,
    /// Records withheld by the dedup gate
    pub records_deduplicated: u64,
    pub alerts: BTreeMap<AlertKind, u64>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            records_read: 0,
            records_published: 0,
            records_deduplicated: 0,
            alerts: BTreeMap::new(),
        }
    }
}

impl RunStats {
    pub fn total_alerts(&self) -> u64 {
        self.alerts.values().sum()
    }

    pub fn alert_count(&self, kind: AlertKind) -> u64 {
        self.alerts.get(&kind).copied().unwrap_or(0)
    }

    pub fn record_alert(&mut self, kind: AlertKind) {
        *self.alerts.entry(kind).or_insert(0) += 1;
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

/// Outcome plus counters, returned by the loop and the session.
#[derive(Debug)]
pub struct IngestReport {
    pub outcome: IngestOutcome,
    pub stats: RunStats,
}
