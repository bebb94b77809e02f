//! MessageRouter: classify, render and deliver inbound messages.
//!
//! The MessageRouter is responsible for:
//! - Receiving `Delivery` items from the delivery channel
//! - Parsing each payload and choosing a formatter by topic and category
//! - Dropping suppressed events (system actor, refine credits)
//! - Handing rendered notifications to the sink
//!
//! Each delivery runs on its own task; a semaphore bounds how many are in
//! flight. Failures are logged and never stop the loop.

mod classify;

pub use classify::{Classification, SuppressReason, classify};

use crate::config::{MAX_IN_FLIGHT, RouterConfig};
use crate::events::{Delivery, DeliveryReceiver, InboundEvent};
use crate::formatters;
use crate::lookup::NameResolver;
use crate::sink::NotificationSink;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, info, warn};

/// Why a delivery was dropped without reaching its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MalformedPayload,
    DeliveryFailed,
}

/// What happened to one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Suppressed(SuppressReason),
    Dropped(DropReason),
}

pub struct MessageRouter {
    config: RouterConfig,
    resolver: Arc<dyn NameResolver>,
    sink: Arc<dyn NotificationSink>,
    permits: Arc<Semaphore>,
    capacity: u32,
}

impl MessageRouter {
    pub fn new(
        config: RouterConfig,
        resolver: Arc<dyn NameResolver>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let capacity = config.max_in_flight.clamp(1, MAX_IN_FLIGHT);
        Self {
            config,
            resolver,
            sink,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity: u32::try_from(capacity).unwrap_or(u32::MAX),
        }
    }

    /// Run the dispatch loop until shutdown or until the channel closes,
    /// then wait for in-flight deliveries to finish.
    pub async fn run(
        self: Arc<Self>,
        mut delivery_rx: DeliveryReceiver,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!(max_in_flight = self.capacity, "MessageRouter started");

        loop {
            // Wait for a free slot first so a saturated pool still sees shutdown.
            let permit = tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if is_stopping(changed, &shutdown_rx) {
                        info!("MessageRouter received shutdown signal");
                        break;
                    }
                    continue;
                }

                permit = Arc::clone(&self.permits).acquire_owned() => {
                    let Ok(permit) = permit else {
                        break;
                    };
                    permit
                }
            };

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if is_stopping(changed, &shutdown_rx) {
                        info!("MessageRouter received shutdown signal");
                        break;
                    }
                }

                delivery = delivery_rx.recv() => {
                    let Some(delivery) = delivery else {
                        info!("Delivery channel closed");
                        break;
                    };
                    let router = Arc::clone(&self);
                    tokio::spawn(async move {
                        router.dispatch(delivery).await;
                        drop(permit);
                    });
                }
            }
        }

        let _drained = self.permits.acquire_many(self.capacity).await;
        info!("MessageRouter shutdown complete");
    }

    /// Route one delivery to its destination.
    #[tracing::instrument(
        skip_all,
        fields(
            delivery_id = %delivery.id,
            destination = %delivery.subscription.destination,
            topic = %delivery.message.topic,
        )
    )]
    pub async fn dispatch(&self, delivery: Delivery) -> DeliveryOutcome {
        let event = match InboundEvent::parse(&delivery.message) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Dropping malformed payload");
                return DeliveryOutcome::Dropped(DropReason::MalformedPayload);
            }
        };

        let route = match classify(&self.config, &event) {
            Classification::Render(route) => route,
            Classification::Suppressed(reason) => {
                debug!(?reason, "Event suppressed");
                return DeliveryOutcome::Suppressed(reason);
            }
        };

        let notification = formatters::render(&route, &event, self.resolver.as_ref()).await;
        match self
            .sink
            .send(&delivery.subscription.destination, &notification)
            .await
        {
            Ok(()) => {
                debug!(title = %notification.title, "Notification delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                warn!(error = %e, title = %notification.title, "Failed to deliver notification");
                DeliveryOutcome::Dropped(DropReason::DeliveryFailed)
            }
        }
    }
}

fn is_stopping(changed: Result<(), watch::error::RecvError>, rx: &watch::Receiver<bool>) -> bool {
    changed.is_err() || *rx.borrow()
}
