//! RabbitMQ adapter over the HTTP management API.
//!
//! Uses the same port as the admin console (15672 by default):
//!
//! ```text
//! GET    /api/overview                                   connect check
//! DELETE /api/queues/{vhost}/{queue}                     reset (404 ok)
//! PUT    /api/queues/{vhost}/{queue}                     declare durable
//! POST   /api/exchanges/{vhost}/amq.default/publish      publish
//! ```
//!
//! The default exchange drops messages whose routing key matches no queue.
//! The API reports that as `"routed": false`, which is logged once and is
//! not treated as a failure.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Broker, BrokerError, PublishError, Publisher};
use crate::config::BrokerSettings;

/// Persistent delivery mode for published messages.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

#[derive(Debug, Deserialize)]
struct PublishReply {
    routed: bool,
}

/// A session against the RabbitMQ management API.
pub struct ManagementBroker {
    client: Client,
    base: Url,
    vhost: String,
    username: String,
    password: String,
    closed: bool,
    warned_unrouted: bool,
}

impl ManagementBroker {
    /// Build a client and verify the broker answers.
    ///
    /// Fails with [`BrokerError::Connection`] when the API is unreachable or
    /// refuses the credentials. No retry.
    pub async fn connect(settings: &BrokerSettings) -> Result<Self, BrokerError> {
        let base = Url::parse(&settings.base_url())
            .map_err(|e| BrokerError::InvalidUrl(format!("{}: {e}", settings.base_url())))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        let broker = Self {
            client,
            base,
            vhost: settings.vhost.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            closed: false,
            warned_unrouted: false,
        };

        let overview = broker.endpoint(&["api", "overview"])?;
        let connection_error = |reason: String| BrokerError::Connection {
            url: broker.base.to_string(),
            reason,
        };
        let response = broker
            .request(Method::GET, overview)
            .send()
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(connection_error(format!("HTTP {}", response.status())));
        }

        info!(url = %broker.base, vhost = %broker.vhost, "Connected to RabbitMQ management API");
        Ok(broker)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BrokerError> {
        api_url(&self.base, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn delete_queue(&self, queue: &str) -> Result<(), BrokerError> {
        let url = self.endpoint(&["api", "queues", &self.vhost, queue])?;
        let response = self.request(Method::DELETE, url).send().await?;
        match response.status() {
            s if s.is_success() => {
                debug!(queue, "Deleted existing queue");
                Ok(())
            }
            StatusCode::NOT_FOUND => Ok(()),
            s => Err(BrokerError::Provision {
                queue: queue.to_string(),
                action: "delete",
                reason: format!("HTTP {s}"),
            }),
        }
    }

    async fn declare_queue(&self, queue: &str) -> Result<(), BrokerError> {
        let url = self.endpoint(&["api", "queues", &self.vhost, queue])?;
        let response = self
            .request(Method::PUT, url)
            .json(&json!({ "durable": true, "auto_delete": false, "arguments": {} }))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(BrokerError::Provision {
                queue: queue.to_string(),
                action: "declare",
                reason: format!("HTTP {status}: {body}"),
            })
        }
    }
}

/// `base` joined with percent-encoded path segments.
///
/// Segments are encoded individually, so the default vhost `/` becomes `%2F`.
pub fn api_url(base: &Url, segments: &[&str]) -> Result<Url, BrokerError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| BrokerError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl Publisher for ManagementBroker {
    async fn publish(&mut self, channel: &str, message: &str) -> Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::Closed);
        }
        let url = self
            .endpoint(&["api", "exchanges", &self.vhost, "amq.default", "publish"])
            .map_err(|e| PublishError::Rejected {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;

        let body = json!({
            "properties": { "delivery_mode": DELIVERY_MODE_PERSISTENT },
            "routing_key": channel,
            "payload": message,
            "payload_encoding": "string",
        });
        let response = self.request(Method::POST, url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                channel: channel.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let reply: PublishReply = response.json().await?;
        if !reply.routed && !self.warned_unrouted {
            self.warned_unrouted = true;
            warn!(
                channel,
                "Broker accepted the message but no queue is bound to this routing key"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for ManagementBroker {
    async fn reset_queues(&mut self, queues: &[String]) -> Result<(), BrokerError> {
        for queue in queues {
            self.delete_queue(queue).await?;
        }
        for queue in queues {
            self.declare_queue(queue).await?;
            info!(queue = %queue, "Declared durable queue");
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrokerError> {
        if !self.closed {
            self.closed = true;
            info!(url = %self.base, "Broker connection closed");
        }
        Ok(())
    }

    fn broker_name(&self) -> &str {
        "RabbitMQ"
    }
}
