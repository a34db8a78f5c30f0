//! Record processing loop.
//!
//! Per record, strictly in sequence:
//!
//! ```text
//! read -> dedup gate -> publish (if accepted) -> alerts -> hooks -> pace
//! ```
//!
//! Alerts run for every record, including ones the dedup gate withheld.
//! Cancellation is observed while waiting on the source and during the
//! pacing delay, never during a publish.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::alerts::AlertEvaluator;
use super::dedup::should_publish;
use super::outcome::{IngestError, IngestOutcome, IngestReport, RunStats};
use super::source::{RecordEvent, RecordSource};
use super::IngestState;
use crate::broker::Publisher;
use crate::config::IngestPolicy;
use crate::types::{AlertEvent, AlertKind, SensorRecord};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

// ============================================================================
// Record Hooks
// ============================================================================

/// Observer called once per fully processed record, before pacing.
///
/// Pass `()` when nothing extra is needed.
pub trait RecordHooks: Send {
    fn on_record(&mut self, record: &SensorRecord, published: bool, alerts: &[AlertEvent]);
}

/// No-op implementation.
impl RecordHooks for () {
    fn on_record(&mut self, _record: &SensorRecord, _published: bool, _alerts: &[AlertEvent]) {}
}

// ============================================================================
// Ingest Loop
// ============================================================================

/// Owns the state of one ingest run.
///
/// Built with [`new()`](IngestLoop::new), optionally given hooks with
/// [`with_hooks()`](IngestLoop::with_hooks), then consumed by
/// [`run()`](IngestLoop::run).
pub struct IngestLoop<H: RecordHooks = ()> {
    policy: IngestPolicy,
    evaluator: AlertEvaluator,
    state: IngestState,
    hooks: H,
    cancel_token: CancellationToken,
}

impl IngestLoop<()> {
    pub fn new(policy: IngestPolicy, cancel_token: CancellationToken) -> Self {
        Self {
            evaluator: AlertEvaluator::new(policy.thresholds),
            policy,
            state: IngestState::new(),
            hooks: (),
            cancel_token,
        }
    }
}

impl<H: RecordHooks> IngestLoop<H> {
    /// Attach a per-record observer.
    pub fn with_hooks<H2: RecordHooks>(self, hooks: H2) -> IngestLoop<H2> {
        IngestLoop {
            policy: self.policy,
            evaluator: self.evaluator,
            state: self.state,
            hooks,
            cancel_token: self.cancel_token,
        }
    }

    /// Run until the source is exhausted, a fatal error occurs, or the
    /// token is cancelled.
    pub async fn run<S, P>(mut self, source: &mut S, publisher: &mut P) -> IngestReport
    where
        S: RecordSource + ?Sized,
        P: Publisher + ?Sized,
    {
        let mut stats = RunStats::default();

        info!("📊 Processing sensor records from {}...", source.source_name());
        info!("{RULE}");

        let outcome = loop {
            let event = tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => break IngestOutcome::Cancelled,
                result = source.next_record() => result,
            };

            let record = match event {
                Ok(RecordEvent::Record(record)) => record,
                Ok(RecordEvent::Eof) => {
                    info!(
                        "[IngestLoop] Source reached end ({} records processed)",
                        stats.records_read
                    );
                    break IngestOutcome::Completed;
                }
                Err(e) => break IngestOutcome::Failed(IngestError::Source(e)),
            };
            stats.records_read += 1;

            // Dedup gate, then publish
            let published = should_publish(record.timestamp, self.state.last_timestamp);
            if published {
                if let Err(e) = publisher
                    .publish(&self.policy.publish_channel, &record.to_message())
                    .await
                {
                    break IngestOutcome::Failed(IngestError::Publish(e));
                }
                self.state.last_timestamp = Some(record.timestamp);
                stats.records_published += 1;
                info!(
                    "Sent: Timestamp={:?}, Cell Density={:?}, O2 Levels={:?}, CO2 Levels={:?}",
                    record.timestamp, record.cell_density, record.o2_level, record.co2_level
                );
            } else {
                stats.records_deduplicated += 1;
            }

            // Alerts are independent of the gate
            let evaluation = self.evaluator.evaluate(&record, &self.state);
            self.state = evaluation.state;
            for alert in &evaluation.alerts {
                stats.record_alert(alert.kind);
                info!(kind = %alert.kind, value = alert.value, "{alert}");
            }

            self.hooks.on_record(&record, published, &evaluation.alerts);

            if !self.policy.pacing.is_zero() {
                tokio::select! {
                    biased;
                    () = self.cancel_token.cancelled() => break IngestOutcome::Cancelled,
                    () = tokio::time::sleep(self.policy.pacing) => {}
                }
            }
        };

        stats.finished_at = Some(chrono::Utc::now());
        match &outcome {
            IngestOutcome::Completed => {}
            IngestOutcome::Cancelled => info!("Program execution was canceled by the user."),
            IngestOutcome::Failed(e) => error!("[IngestLoop] Fatal: {e}"),
        }
        log_final_stats(&stats);

        IngestReport { outcome, stats }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn log_final_stats(stats: &RunStats) {
    info!("");
    info!("{RULE}");
    info!("📊 FINAL STATISTICS");
    info!("{RULE}");
    info!("   Records Read:         {}", stats.records_read);
    info!("   Records Published:    {}", stats.records_published);
    info!("   Duplicates Withheld:  {}", stats.records_deduplicated);
    info!("   Alerts Raised:        {}", stats.total_alerts());
    for kind in AlertKind::ALL {
        let count = stats.alert_count(kind);
        if count > 0 {
            info!("      {:<20} {}", kind.as_str(), count);
        }
    }
    info!(
        "   Elapsed:              {:.1}s",
        stats.elapsed().num_milliseconds() as f64 / 1000.0
    );
    info!("{RULE}");
}
