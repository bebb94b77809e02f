//! Durable subscription storage.

use crate::entities::subscription::{
    DeleteSubscription, InsertSubscription, ListAllSubscriptions, ListSubscriptionsByDestination,
    SubscriptionRecord,
};
use crate::events::SubscriptionKey;
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use relay_sdk::objects::Destination;
use relay_sdk::topic::{PatternError, TopicPattern};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The (destination, pattern) pair is already stored.
    #[error("subscription {pattern} already exists for {destination}")]
    Duplicate {
        destination: Destination,
        pattern: TopicPattern,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The persistence contract: one table keyed by (destination, pattern).
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<SubscriptionKey>, StoreError>;

    /// Patterns stored for one destination, ordered by pattern, exactly as
    /// stored.
    async fn list_by_destination(
        &self,
        destination: &Destination,
    ) -> Result<Vec<String>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] if the pair exists.
    async fn insert(&self, key: &SubscriptionKey) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError>;
}

#[async_trait]
impl SubscriptionStore for DatabaseProcessor {
    async fn list_all(&self) -> Result<Vec<SubscriptionKey>, StoreError> {
        let records = self.process(ListAllSubscriptions).await?;
        Ok(records.into_iter().filter_map(record_to_key).collect())
    }

    async fn list_by_destination(
        &self,
        destination: &Destination,
    ) -> Result<Vec<String>, StoreError> {
        let records = self
            .process(ListSubscriptionsByDestination {
                destination: destination.to_string(),
            })
            .await?;
        Ok(records.into_iter().map(listed_pattern).collect())
    }

    async fn insert(&self, key: &SubscriptionKey) -> Result<(), StoreError> {
        let result = self
            .process(InsertSubscription {
                destination: key.destination.to_string(),
                pattern: key.pattern.to_string(),
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate {
                    destination: key.destination.clone(),
                    pattern: key.pattern.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError> {
        let removed = self
            .process(DeleteSubscription {
                destination: key.destination.to_string(),
                pattern: key.pattern.to_string(),
            })
            .await?;
        Ok(removed > 0)
    }
}

/// Listing shows every stored row; an invalid pattern is only flagged.
fn listed_pattern(record: SubscriptionRecord) -> String {
    if let Err(e) = TopicPattern::new(record.pattern.as_str()) {
        warn!(
            destination = %record.destination,
            pattern = %record.pattern,
            error = %e,
            "Listing stored subscription with invalid pattern"
        );
    }
    record.pattern
}

/// Rows whose pattern no longer validates are not replayed.
fn record_to_key(record: SubscriptionRecord) -> Option<SubscriptionKey> {
    match TopicPattern::new(record.pattern.as_str()) {
        Ok(pattern) => Some(SubscriptionKey::new(
            Destination::from(record.destination),
            pattern,
        )),
        Err(e) => {
            log_invalid_record(&record, &e);
            None
        }
    }
}

fn log_invalid_record(record: &SubscriptionRecord, error: &PatternError) {
    warn!(
        destination = %record.destination,
        pattern = %record.pattern,
        error = %error,
        "Skipping stored subscription with invalid pattern"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pattern: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            destination: "C1".to_owned(),
            pattern: pattern.to_owned(),
            created_at: time::PrimitiveDateTime::new(time::Date::MIN, time::Time::MIDNIGHT),
        }
    }

    #[test]
    fn test_invalid_rows_are_listed_but_not_replayed() {
        assert_eq!(listed_pattern(record("ns.*.grid")), "ns.*.grid");
        assert!(record_to_key(record("ns.*.grid")).is_none());
    }

    #[test]
    fn test_valid_rows_become_keys() {
        let key = record_to_key(record("ns.grid.>")).unwrap();
        assert_eq!(key.destination.as_str(), "C1");
        assert_eq!(key.pattern.as_str(), "ns.grid.>");
        assert_eq!(listed_pattern(record("ns.grid.>")), "ns.grid.>");
    }
}
