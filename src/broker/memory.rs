//! In-process broker.
//!
//! Records every queue reset, publish and close so a dry run can show what
//! would have been sent, and tests can assert on it. Observation goes
//! through a cloneable [`MemoryBrokerHandle`] that outlives the broker.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::{Broker, BrokerError, PublishError, Publisher};

/// Everything the memory broker has seen.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    /// Queues currently declared, in declaration order
    pub queues: Vec<String>,
    /// Number of queue deletions performed
    pub deletes: usize,
    /// `(channel, message)` in publish order
    pub published: Vec<(String, String)>,
    /// Number of `close()` calls that actually closed the connection
    pub closes: usize,
}

#[derive(Debug, Default)]
struct Shared {
    log: MemoryLog,
    /// 1-based publish attempt that is rejected
    fail_publish_at: Option<usize>,
    attempts: usize,
    closed: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A poisoned lock only means a test thread panicked mid-update.
    shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Read-only view onto a [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct MemoryBrokerHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryBrokerHandle {
    pub fn snapshot(&self) -> MemoryLog {
        lock(&self.shared).log.clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        lock(&self.shared).log.published.clone()
    }

    pub fn close_count(&self) -> usize {
        lock(&self.shared).log.closes
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }
}

#[derive(Debug, Default)]
pub struct MemoryBroker {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`-th publish attempt (1-based).
    #[must_use]
    pub fn failing_publish_at(self, n: usize) -> Self {
        lock(&self.shared).fail_publish_at = Some(n);
        self
    }

    pub fn handle(&self) -> MemoryBrokerHandle {
        MemoryBrokerHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl Publisher for MemoryBroker {
    async fn publish(&mut self, channel: &str, message: &str) -> Result<(), PublishError> {
        let mut shared = lock(&self.shared);
        if shared.closed {
            return Err(PublishError::Closed);
        }
        shared.attempts += 1;
        if shared.fail_publish_at == Some(shared.attempts) {
            return Err(PublishError::Rejected {
                channel: channel.to_string(),
                reason: format!("injected failure on publish #{}", shared.attempts),
            });
        }
        debug!(channel, message, "[MemoryBroker] publish");
        shared
            .log
            .published
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn reset_queues(&mut self, queues: &[String]) -> Result<(), BrokerError> {
        let mut shared = lock(&self.shared);
        for queue in queues {
            if let Some(pos) = shared.log.queues.iter().position(|q| q == queue) {
                shared.log.queues.remove(pos);
                shared.log.deletes += 1;
            }
        }
        shared.log.queues.extend(queues.iter().cloned());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrokerError> {
        let mut shared = lock(&self.shared);
        if !shared.closed {
            shared.closed = true;
            shared.log.closes += 1;
        }
        Ok(())
    }

    fn broker_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_replaces_existing_queues() {
        let mut broker = MemoryBroker::new();
        let handle = broker.handle();
        let queues = vec!["a".to_string(), "b".to_string()];

        broker.reset_queues(&queues).await.expect("reset");
        broker.reset_queues(&queues).await.expect("reset again");

        let log = handle.snapshot();
        assert_eq!(log.queues, queues);
        assert_eq!(log.deletes, 2);
    }

    #[tokio::test]
    async fn test_injected_failure_and_close() {
        let mut broker = MemoryBroker::new().failing_publish_at(2);
        let handle = broker.handle();

        broker.publish("ch", "1.0,1.0,40.0,10.0").await.expect("first publish");
        assert!(matches!(
            broker.publish("ch", "2.0,1.0,40.0,10.0").await,
            Err(PublishError::Rejected { .. })
        ));
        assert_eq!(handle.published().len(), 1);

        broker.close().await.expect("close");
        broker.close().await.expect("second close is a no-op");
        assert_eq!(handle.close_count(), 1);
        assert!(matches!(
            broker.publish("ch", "3.0,1.0,40.0,10.0").await,
            Err(PublishError::Closed)
        ));
    }
}
