//! Message broker abstraction.
//!
//! The ingest loop only needs [`Publisher`]. The session additionally
//! provisions queues and closes the connection through [`Broker`].
//!
//! Implementations:
//! - [`ManagementBroker`]: RabbitMQ over its HTTP management API
//! - [`MemoryBroker`]: in-process broker for dry runs and tests

use async_trait::async_trait;
use thiserror::Error;

pub mod management;
pub mod memory;

pub use management::ManagementBroker;
pub use memory::{MemoryBroker, MemoryBrokerHandle};

/// Failures while connecting to or provisioning the broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Connection to broker at {url} failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("Failed to {action} queue '{queue}': {reason}")]
    Provision {
        queue: String,
        action: &'static str,
        reason: String,
    },

    #[error("Invalid broker URL: {0}")]
    InvalidUrl(String),

    #[error("Broker HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A publish the broker did not accept. Never retried.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Publish to '{channel}' rejected: {reason}")]
    Rejected { channel: String, reason: String },

    #[error("Publish transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Broker connection is closed")]
    Closed,
}

/// Delivers one formatted record to a named channel.
#[async_trait]
pub trait Publisher: Send {
    /// Publish `message` under routing key `channel`.
    ///
    /// A single call per record; the loop never races it against cancellation.
    async fn publish(&mut self, channel: &str, message: &str) -> Result<(), PublishError>;
}

/// A connected broker session.
#[async_trait]
pub trait Broker: Publisher {
    /// Delete each queue if present, then declare it durable.
    async fn reset_queues(&mut self, queues: &[String]) -> Result<(), BrokerError>;

    /// Release the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<(), BrokerError>;

    /// Human-readable name for logging (e.g. "RabbitMQ", "memory").
    fn broker_name(&self) -> &str;
}
