//! In-memory stand-ins for the relay's collaborators.
//!
//! Compiled for this crate's tests and, through the `testing` feature, for
//! downstream test suites.

use crate::broker::{Broker, BrokerError, MessageStream};
use crate::events::{InboundMessage, SubscriptionKey};
use crate::lookup::{LookupError, NameResolver};
use crate::sink::{NotificationSink, SinkError};
use crate::store::{StoreError, SubscriptionStore};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use relay_sdk::objects::{Destination, RenderedNotification};
use relay_sdk::topic::TopicPattern;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// MemoryBroker
// ---------------------------------------------------------------------------

/// Broker that matches published topics against subscribed patterns.
pub struct MemoryBroker {
    connected: AtomicBool,
    failing_patterns: Mutex<HashSet<String>>,
    subscribers: Mutex<Vec<(TopicPattern, mpsc::UnboundedSender<InboundMessage>)>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            failing_patterns: Mutex::new(HashSet::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every subscribe call for `pattern` fail.
    pub fn fail_subscriptions_to(&self, pattern: &str) {
        lock(&self.failing_patterns).insert(pattern.to_owned());
    }

    /// Deliver a message to every live matching subscription. Returns how
    /// many subscriptions received it.
    pub fn publish(&self, topic: &str, payload: impl Into<Bytes>) -> usize {
        let payload = payload.into();
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|(_, tx)| !tx.is_closed());
        subscribers
            .iter()
            .filter(|(pattern, _)| pattern.matches(topic))
            .filter(|(_, tx)| {
                tx.send(InboundMessage {
                    topic: topic.to_owned(),
                    payload: payload.clone(),
                })
                .is_ok()
            })
            .count()
    }

    /// Subscriptions whose stream is still held by someone.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.subscribers)
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn subscribe(&self, pattern: &TopicPattern) -> Result<MessageStream, BrokerError> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }
        if lock(&self.failing_patterns).contains(pattern.as_str()) {
            return Err(BrokerError::Subscribe {
                pattern: pattern.to_string(),
                reason: "permissions violation".to_owned(),
            });
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push((pattern.clone(), tx));
        Ok(futures_util::stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Subscription table kept in a sorted set.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeSet<SubscriptionKey>>,
    failing_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        let store = Self::new();
        {
            let mut set = lock(&store.records);
            for (destination, pattern) in records {
                if let Ok(pattern) = TopicPattern::new(pattern) {
                    set.insert(SubscriptionKey::new(Destination::new(destination), pattern));
                }
            }
        }
        store
    }

    /// Make `list_all` and `list_by_destination` fail.
    pub fn fail_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<SubscriptionKey> {
        lock(&self.records).iter().cloned().collect()
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<SubscriptionKey>, StoreError> {
        self.check_reads()?;
        Ok(self.snapshot())
    }

    async fn list_by_destination(
        &self,
        destination: &Destination,
    ) -> Result<Vec<String>, StoreError> {
        self.check_reads()?;
        Ok(lock(&self.records)
            .iter()
            .filter(|key| &key.destination == destination)
            .map(|key| key.pattern.to_string())
            .collect())
    }

    async fn insert(&self, key: &SubscriptionKey) -> Result<(), StoreError> {
        if lock(&self.records).insert(key.clone()) {
            Ok(())
        } else {
            Err(StoreError::Duplicate {
                destination: key.destination.clone(),
                pattern: key.pattern.clone(),
            })
        }
    }

    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError> {
        Ok(lock(&self.records).remove(key))
    }
}

// ---------------------------------------------------------------------------
// StaticResolver
// ---------------------------------------------------------------------------

/// Name lookups served from fixed maps.
#[derive(Default)]
pub struct StaticResolver {
    players: HashMap<String, String>,
    guilds: HashMap<String, String>,
    addresses: HashMap<String, String>,
    failing: bool,
}

impl StaticResolver {
    /// A resolver whose every lookup errors.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn player(mut self, id: &str, username: &str) -> Self {
        self.players.insert(id.to_owned(), username.to_owned());
        self
    }

    pub fn guild(mut self, id: &str, name: &str) -> Self {
        self.guilds.insert(id.to_owned(), name.to_owned());
        self
    }

    pub fn address(mut self, address: &str, player_id: &str) -> Self {
        self.addresses.insert(address.to_owned(), player_id.to_owned());
        self
    }

    fn get(&self, map: &HashMap<String, String>, key: &str) -> Result<Option<String>, LookupError> {
        if self.failing {
            return Err(LookupError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(map.get(key).cloned())
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn player_name(&self, player_id: &str) -> Result<Option<String>, LookupError> {
        self.get(&self.players, player_id)
    }

    async fn guild_name(&self, guild_id: &str) -> Result<Option<String>, LookupError> {
        self.get(&self.guilds, guild_id)
    }

    async fn address_owner(&self, address: &str) -> Result<Option<String>, LookupError> {
        self.get(&self.addresses, address)
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Sink that records what it was asked to deliver.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(Destination, RenderedNotification)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every delivery from now on.
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Destination, RenderedNotification)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(
        &self,
        destination: &Destination,
        notification: &RenderedNotification,
    ) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected {
                status: 503,
                body: "unavailable".to_owned(),
            });
        }
        lock(&self.sent).push((destination.clone(), notification.clone()));
        Ok(())
    }
}
