//! Notification delivery.
//!
//! The router hands every rendered notification to a `NotificationSink`.
//! Delivery is attempted once; failures are reported back to the router,
//! which logs them and moves on.

mod discord;

pub use discord::DiscordSink;

use async_trait::async_trait;
use relay_sdk::objects::{Destination, RenderedNotification};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// Transport-level failure (DNS, TLS, timeout, …).
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The chat API answered with a non-2xx status.
    #[error("delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid destination {0}")]
    InvalidDestination(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        destination: &Destination,
        notification: &RenderedNotification,
    ) -> Result<(), SinkError>;
}
