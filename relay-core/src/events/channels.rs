//! Delivery channel factory and handles.

use super::types::Delivery;
use tokio::sync::mpsc;

/// Default buffer size for the delivery channel.
///
/// Absorbs bursts while keeping memory bounded; when full, subscription
/// pumps wait, which in turn applies backpressure to the broker client.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for deliveries (one clone per live subscription).
pub type DeliverySender = mpsc::Sender<Delivery>;
/// Receiver handle for deliveries (owned by the router).
pub type DeliveryReceiver = mpsc::Receiver<Delivery>;

/// Create the delivery channel shared by the registry and the router.
pub fn delivery_channel() -> (DeliverySender, DeliveryReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
