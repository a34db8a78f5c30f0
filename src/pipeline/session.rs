//! Scoped broker session.
//!
//! Wraps one ingest run in the broker's lifetime: reset the queues, run the
//! loop, and close the connection on every exit path (completion, fatal
//! error, cancellation, provisioning failure). An interrupt that lands
//! before the reset leaves the queues untouched.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::outcome::{IngestError, IngestOutcome, IngestReport, RunStats};
use super::processing_loop::{IngestLoop, RecordHooks};
use super::source::RecordSource;
use crate::broker::Broker;
use crate::config::IngestPolicy;

/// Run one ingest session against an already-connected broker.
///
/// The broker is closed exactly once before this returns.
pub async fn run_session<B, S, H>(
    broker: &mut B,
    source: &mut S,
    policy: IngestPolicy,
    hooks: H,
    cancel_token: CancellationToken,
) -> IngestReport
where
    B: Broker + ?Sized,
    S: RecordSource + ?Sized,
    H: RecordHooks,
{
    info!(
        "🔗 Broker: {} | publish channel: {} | queues: {}",
        broker.broker_name(),
        policy.publish_channel,
        policy.queues.join(", ")
    );

    let report = if cancel_token.is_cancelled() {
        info!("Program execution was canceled by the user.");
        IngestReport {
            outcome: IngestOutcome::Cancelled,
            stats: RunStats::default(),
        }
    } else {
        match broker.reset_queues(&policy.queues).await {
            Ok(()) => {
                IngestLoop::new(policy, cancel_token)
                    .with_hooks(hooks)
                    .run(source, broker)
                    .await
            }
            Err(e) => IngestReport {
                outcome: IngestOutcome::Failed(IngestError::Provision(e)),
                stats: RunStats::default(),
            },
        }
    };

    if let Err(e) = broker.close().await {
        warn!("Failed to close broker connection cleanly: {e}");
    }

    report
}
