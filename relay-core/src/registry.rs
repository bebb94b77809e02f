//! SubscriptionRegistry: the live set of broker subscriptions.
//!
//! The registry is responsible for:
//! - Replaying stored subscriptions once at startup
//! - Persisting then subscribing on add, unsubscribing then deleting on remove
//! - Forwarding each live subscription's messages into the delivery channel
//!
//! The store is the durable truth; the registry only reconciles with it at
//! startup and on explicit mutation.

use crate::broker::{Broker, BrokerError, MessageStream};
use crate::events::{Delivery, DeliverySender, SubscriptionKey};
use crate::store::{StoreError, SubscriptionStore};
use futures_util::StreamExt;
use relay_sdk::objects::Destination;
use relay_sdk::topic::TopicPattern;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("broker is not connected")]
    NotConnected,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record was persisted but the live subscription could not be
    /// created. It is replayed on the next start.
    #[error("subscription saved but not active: {0}")]
    Subscribe(#[source] BrokerError),
}

/// Result of replaying stored subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

pub struct SubscriptionRegistry {
    broker: Arc<dyn Broker>,
    store: Arc<dyn SubscriptionStore>,
    delivery_tx: DeliverySender,
    live: RwLock<HashMap<SubscriptionKey, JoinHandle<()>>>,
}

impl SubscriptionRegistry {
    pub fn new(
        broker: Arc<dyn Broker>,
        store: Arc<dyn SubscriptionStore>,
        delivery_tx: DeliverySender,
    ) -> Self {
        Self {
            broker,
            store,
            delivery_tx,
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe every stored record.
    ///
    /// A store read failure is returned; a record that fails to subscribe is
    /// logged and skipped.
    pub async fn load_all(&self) -> Result<LoadReport, RegistryError> {
        let keys = self.store.list_all().await?;
        let mut report = LoadReport::default();

        for key in keys {
            match self.activate(key.clone()).await {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    warn!(
                        destination = %key.destination,
                        pattern = %key.pattern,
                        error = %e,
                        "Failed to restore subscription, skipping"
                    );
                    report.skipped += 1;
                }
            }
        }

        info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "Stored subscriptions replayed"
        );
        Ok(report)
    }

    /// Persist a subscription, then start receiving its messages.
    pub async fn add(
        &self,
        destination: Destination,
        pattern: TopicPattern,
    ) -> Result<(), RegistryError> {
        if !self.broker.is_connected() {
            return Err(RegistryError::NotConnected);
        }

        let key = SubscriptionKey::new(destination, pattern);
        self.store.insert(&key).await?;

        if let Err(e) = self.activate(key.clone()).await {
            warn!(
                destination = %key.destination,
                pattern = %key.pattern,
                error = %e,
                "Subscription saved but broker subscribe failed"
            );
            return Err(RegistryError::Subscribe(e));
        }

        info!(destination = %key.destination, pattern = %key.pattern, "Subscription added");
        Ok(())
    }

    /// Stop receiving a subscription's messages, then delete its record.
    /// Removing an unknown subscription succeeds.
    pub async fn remove(
        &self,
        destination: Destination,
        pattern: TopicPattern,
    ) -> Result<(), RegistryError> {
        let key = SubscriptionKey::new(destination, pattern);

        let live = self.live.write().await.remove(&key);
        if let Some(pump) = live {
            stop_pump(pump).await;
        }
        let deleted = self.store.delete(&key).await?;

        info!(
            destination = %key.destination,
            pattern = %key.pattern,
            deleted,
            "Subscription removed"
        );
        Ok(())
    }

    /// Stored patterns for a destination, ordered by pattern.
    pub async fn list(&self, destination: &Destination) -> Result<Vec<String>, RegistryError> {
        Ok(self.store.list_by_destination(destination).await?)
    }

    pub fn is_connected(&self) -> bool {
        self.broker.is_connected()
    }

    pub async fn live_count(&self) -> usize {
        self.live.read().await.len()
    }

    /// Cancel every live subscription. Stored records are kept.
    pub async fn shutdown(&self) {
        let pumps: Vec<_> = self.live.write().await.drain().collect();
        let count = pumps.len();
        for (_, pump) in pumps {
            stop_pump(pump).await;
        }
        info!(count, "Live subscriptions cancelled");
    }

    async fn activate(&self, key: SubscriptionKey) -> Result<(), BrokerError> {
        let stream = self.broker.subscribe(&key.pattern).await?;
        let pump = spawn_pump(key.clone(), stream, self.delivery_tx.clone());
        let replaced = self.live.write().await.insert(key, pump);
        if let Some(previous) = replaced {
            stop_pump(previous).await;
        }
        Ok(())
    }
}

/// Forward a subscription's messages into the delivery channel until the
/// stream ends or the channel closes.
fn spawn_pump(key: SubscriptionKey, mut stream: MessageStream, tx: DeliverySender) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            if tx.send(Delivery::new(key.clone(), message)).await.is_err() {
                debug!(destination = %key.destination, pattern = %key.pattern, "Delivery channel closed");
                return;
            }
        }
        debug!(destination = %key.destination, pattern = %key.pattern, "Subscription stream ended");
    })
}

/// Abort a pump and wait until its stream has been dropped.
async fn stop_pump(pump: JoinHandle<()>) {
    pump.abort();
    let _ = pump.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DeliveryReceiver, delivery_channel};
    use crate::testing::{MemoryBroker, MemoryStore};
    use std::time::Duration;

    struct Harness {
        broker: Arc<MemoryBroker>,
        store: Arc<MemoryStore>,
        registry: SubscriptionRegistry,
        delivery_rx: DeliveryReceiver,
    }

    fn harness(store: MemoryStore) -> Harness {
        let broker = Arc::new(MemoryBroker::new());
        let store = Arc::new(store);
        let (delivery_tx, delivery_rx) = delivery_channel();
        let registry = SubscriptionRegistry::new(
            Arc::clone(&broker) as Arc<dyn Broker>,
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            delivery_tx,
        );
        Harness {
            broker,
            store,
            registry,
            delivery_rx,
        }
    }

    fn pattern(raw: &str) -> TopicPattern {
        TopicPattern::new(raw).unwrap()
    }

    fn c1() -> Destination {
        Destination::new("C1")
    }

    #[tokio::test]
    async fn test_add_while_disconnected_leaves_store_untouched() {
        let h = harness(MemoryStore::new());
        h.broker.set_connected(false);

        let result = h.registry.add(c1(), pattern("ns.grid.>")).await;

        assert!(matches!(result, Err(RegistryError::NotConnected)));
        assert!(h.store.snapshot().is_empty());
        assert_eq!(h.registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_add_keeps_one_live_subscription() {
        let h = harness(MemoryStore::new());
        h.registry.add(c1(), pattern("ns.grid.>")).await.unwrap();

        let second = h.registry.add(c1(), pattern("ns.grid.>")).await;

        assert!(matches!(
            second,
            Err(RegistryError::Store(StoreError::Duplicate { .. }))
        ));
        assert_eq!(h.registry.live_count().await, 1);
        assert_eq!(h.broker.active_subscriptions(), 1);
        assert_eq!(h.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_store() {
        let h = harness(MemoryStore::with_records([("C2", "ns.player.>")]));
        let before = h.store.snapshot();

        h.registry.add(c1(), pattern("ns.guild.0-3.>")).await.unwrap();
        assert_eq!(h.broker.active_subscriptions(), 1);
        h.registry.remove(c1(), pattern("ns.guild.0-3.>")).await.unwrap();

        assert_eq!(h.store.snapshot(), before);
        assert_eq!(h.registry.live_count().await, 0);
        assert_eq!(h.broker.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let h = harness(MemoryStore::new());
        h.registry.remove(c1(), pattern("ns.>")).await.unwrap();
        h.registry.remove(c1(), pattern("ns.>")).await.unwrap();
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failed_subscribe_is_still_listed() {
        let h = harness(MemoryStore::new());
        h.broker.fail_subscriptions_to("ns.provider.>");

        let result = h.registry.add(c1(), pattern("ns.provider.>")).await;

        assert!(matches!(result, Err(RegistryError::Subscribe(_))));
        assert_eq!(h.registry.live_count().await, 0);
        assert_eq!(h.registry.list(&c1()).await.unwrap(), vec!["ns.provider.>"]);
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_scoped() {
        let h = harness(MemoryStore::with_records([
            ("C1", "ns.player.>"),
            ("C1", "ns.grid.>"),
            ("C2", "ns.>"),
        ]));
        assert_eq!(
            h.registry.list(&c1()).await.unwrap(),
            vec!["ns.grid.>", "ns.player.>"]
        );
        assert!(h.registry.list(&Destination::new("C3")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_all_skips_failing_records() {
        let h = harness(MemoryStore::with_records([
            ("C1", "ns.grid.>"),
            ("C1", "ns.provider.>"),
            ("C2", "ns.>"),
        ]));
        h.broker.fail_subscriptions_to("ns.provider.>");

        let report = h.registry.load_all().await.unwrap();

        assert_eq!(report, LoadReport { loaded: 2, skipped: 1 });
        assert_eq!(h.registry.live_count().await, 2);
        assert_eq!(h.store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_load_all_fails_on_store_error() {
        let h = harness(MemoryStore::with_records([("C1", "ns.>")]));
        h.store.fail_reads();
        assert!(matches!(
            h.registry.load_all().await,
            Err(RegistryError::Store(StoreError::Database(_)))
        ));
        assert_eq!(h.registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_messages_flow_into_delivery_channel() {
        let mut h = harness(MemoryStore::new());
        h.registry.add(c1(), pattern("ns.grid.>")).await.unwrap();
        h.registry
            .add(Destination::new("C2"), pattern("ns.grid.capacity"))
            .await
            .unwrap();

        assert_eq!(h.broker.publish("ns.grid.capacity", &b"{}"[..]), 2);
        assert_eq!(h.broker.publish("ns.grid.load", &b"{}"[..]), 1);
        assert_eq!(h.broker.publish("ns.player.1-7", &b"{}"[..]), 0);

        let mut received = Vec::new();
        for _ in 0..3 {
            let delivery = tokio::time::timeout(Duration::from_secs(5), h.delivery_rx.recv())
                .await
                .unwrap()
                .unwrap();
            received.push((
                delivery.subscription.destination.to_string(),
                delivery.message.topic,
            ));
        }
        received.sort();
        assert_eq!(
            received,
            vec![
                ("C1".to_owned(), "ns.grid.capacity".to_owned()),
                ("C1".to_owned(), "ns.grid.load".to_owned()),
                ("C2".to_owned(), "ns.grid.capacity".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_cancels_live_subscriptions_only() {
        let h = harness(MemoryStore::new());
        h.registry.add(c1(), pattern("ns.>")).await.unwrap();
        h.registry.shutdown().await;
        assert_eq!(h.registry.live_count().await, 0);
        assert_eq!(h.broker.active_subscriptions(), 0);
        assert_eq!(h.store.snapshot().len(), 1);
    }
}
