//! Message types flowing from the broker to the router.
//!
//! # Flow
//!
//! 1. A live subscription's pump reads `InboundMessage`s off its broker stream
//! 2. Each is tagged with its subscription and sent as a `Delivery`
//! 3. `MessageRouter` parses the payload into an `InboundEvent` and renders it
//!
//! Deliveries are ephemeral; nothing here is persisted.

pub mod channels;
pub mod types;

pub use channels::{DEFAULT_CHANNEL_BUFFER, DeliveryReceiver, DeliverySender, delivery_channel};
pub use types::{Delivery, InboundEvent, InboundMessage, Payload, PayloadError, SubscriptionKey};
