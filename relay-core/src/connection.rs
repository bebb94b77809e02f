//! ConnectionManager: the single broker connection.
//!
//! The ConnectionManager is responsible for:
//! - Connecting to NATS, failing fast when the broker is unreachable
//! - Tracking connectivity from the client's connection events
//! - Bounded transport-level reconnects with exponential backoff
//! - One health-check subscription that verifies end-to-end message flow
//!
//! The NATS client re-sends its active subscriptions after a transport
//! reconnect, so live subscriptions survive a drop without the registry
//! having to replay them.

use crate::broker::{Broker, BrokerError, MessageStream};
use crate::config::BrokerConfig;
use crate::events::InboundMessage;
use async_nats::{Client, ConnectOptions, Event};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use relay_sdk::topic::TopicPattern;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reconnect backoff is capped at 2^MAX_BACKOFF_EXPONENT seconds.
const MAX_BACKOFF_EXPONENT: u32 = 6;

const HEALTH_CHECK_PAYLOAD: &[u8] = b"ping";

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("timed out after {timeout:?} connecting to broker at {address}")]
    Timeout { address: String, timeout: Duration },

    #[error("failed to connect to broker at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: async_nats::ConnectError,
    },

    #[error("failed to set up broker health check: {0}")]
    HealthCheck(String),
}

/// Owns the broker client and its connectivity flag.
pub struct ConnectionManager {
    client: Client,
    connected: Arc<watch::Sender<bool>>,
    health_task: JoinHandle<()>,
}

impl ConnectionManager {
    /// Connect to the broker described by `config`.
    ///
    /// Returns an error if the broker cannot be reached within
    /// `connect_timeout`; callers treat that as fatal.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, ConnectionError> {
        let (connected, _) = watch::channel(false);
        let connected = Arc::new(connected);

        let events_connected = Arc::clone(&connected);
        let options = ConnectOptions::new()
            .connection_timeout(config.connect_timeout)
            .max_reconnects(config.max_reconnect_attempts)
            .reconnect_delay_callback(reconnect_delay)
            .event_callback(move |event| {
                let connected = Arc::clone(&events_connected);
                async move { on_connection_event(&connected, event) }
            });

        info!(address = %config.address, "Connecting to broker");
        let client = tokio::time::timeout(
            config.connect_timeout,
            options.connect(config.address.as_str()),
        )
        .await
        .map_err(|_| ConnectionError::Timeout {
            address: config.address.clone(),
            timeout: config.connect_timeout,
        })?
        .map_err(|source| ConnectionError::Connect {
            address: config.address.clone(),
            source,
        })?;
        connected.send_replace(true);
        info!(address = %config.address, "Broker connection established");

        let health_task = start_health_check(&client, &config.health_subject).await?;

        Ok(Self {
            client,
            connected,
            health_task,
        })
    }

    /// Stop the health check and flush pending publishes.
    pub async fn shutdown(&self) {
        self.health_task.abort();
        if let Err(e) = self.client.flush().await {
            warn!(error = %e, "Failed to flush broker connection on shutdown");
        }
        self.connected.send_replace(false);
        info!("Broker connection shut down");
    }
}

#[async_trait]
impl Broker for ConnectionManager {
    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    async fn subscribe(&self, pattern: &TopicPattern) -> Result<MessageStream, BrokerError> {
        let subscriber = self
            .client
            .subscribe(pattern.to_string())
            .await
            .map_err(|e| BrokerError::Subscribe {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(subscriber
            .map(|message| InboundMessage {
                topic: message.subject.to_string(),
                payload: message.payload,
            })
            .boxed())
    }
}

fn on_connection_event(connected: &watch::Sender<bool>, event: Event) {
    match event {
        Event::Connected => {
            let was_connected = connected.send_replace(true);
            if !was_connected {
                info!("Broker connection re-established");
            }
        }
        Event::Disconnected => {
            connected.send_replace(false);
            warn!("Broker connection lost, transport will retry");
        }
        other => {
            debug!(event = ?other, "Broker connection event");
        }
    }
}

/// Delay before reconnect attempt `attempts`.
///
/// Exponential backoff: 2^attempts seconds, capped at
/// 2^MAX_BACKOFF_EXPONENT. The first attempt is immediate.
pub fn reconnect_delay(attempts: usize) -> Duration {
    if attempts == 0 {
        return Duration::ZERO;
    }
    let exponent = u32::try_from(attempts)
        .unwrap_or(MAX_BACKOFF_EXPONENT)
        .min(MAX_BACKOFF_EXPONENT);
    Duration::from_secs(2u64.pow(exponent))
}

/// Subscribe to the health subject, publish one ping to it and log when it
/// comes back.
async fn start_health_check(
    client: &Client,
    subject: &str,
) -> Result<JoinHandle<()>, ConnectionError> {
    let mut subscriber = client
        .subscribe(subject.to_owned())
        .await
        .map_err(|e| ConnectionError::HealthCheck(e.to_string()))?;

    let watched_subject = subject.to_owned();
    let task = tokio::spawn(async move {
        let mut round_trips: u64 = 0;
        while let Some(_message) = subscriber.next().await {
            round_trips += 1;
            if round_trips == 1 {
                info!(subject = %watched_subject, "Broker health check round trip ok");
            } else {
                debug!(subject = %watched_subject, round_trips, "Broker health check message");
            }
        }
        debug!(subject = %watched_subject, "Health check subscription ended");
    });

    client
        .publish(subject.to_owned(), Bytes::from_static(HEALTH_CHECK_PAYLOAD))
        .await
        .map_err(|e| ConnectionError::HealthCheck(e.to_string()))?;

    Ok(task)
}
