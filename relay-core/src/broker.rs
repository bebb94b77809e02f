//! The broker seam.
//!
//! The registry only needs two things from the broker connection: whether it
//! is currently up, and a message stream per pattern. `ConnectionManager`
//! provides them over NATS; tests use an in-memory broker.

use crate::events::InboundMessage;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use relay_sdk::topic::TopicPattern;
use thiserror::Error;

/// Messages delivered to one subscription. Dropping the stream cancels the
/// subscription on the broker.
pub type MessageStream = BoxStream<'static, InboundMessage>;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker is not connected")]
    NotConnected,

    #[error("failed to subscribe to {pattern}: {reason}")]
    Subscribe { pattern: String, reason: String },

    #[error("failed to publish to {subject}: {reason}")]
    Publish { subject: String, reason: String },
}

#[async_trait]
pub trait Broker: Send + Sync {
    /// Current transport connectivity.
    fn is_connected(&self) -> bool;

    /// Create a live subscription for `pattern`.
    async fn subscribe(&self, pattern: &TopicPattern) -> Result<MessageStream, BrokerError>;
}
