use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

/// One persisted (destination, pattern) pair.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SubscriptionRecord {
    pub destination: String,
    pub pattern: String,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// Every stored subscription, used to replay the live set at startup.
pub struct ListAllSubscriptions;

impl Processor<ListAllSubscriptions> for DatabaseProcessor {
    type Output = Vec<SubscriptionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListAllSubscriptions")]
    async fn process(&self, _query: ListAllSubscriptions) -> Result<Vec<SubscriptionRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT destination, pattern, created_at
            FROM relay_subscriptions
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Subscriptions of one destination, ordered by pattern.
pub struct ListSubscriptionsByDestination {
    pub destination: String,
}

impl Processor<ListSubscriptionsByDestination> for DatabaseProcessor {
    type Output = Vec<SubscriptionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListSubscriptionsByDestination")]
    async fn process(
        &self,
        query: ListSubscriptionsByDestination,
    ) -> Result<Vec<SubscriptionRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT destination, pattern, created_at
            FROM relay_subscriptions
            WHERE destination = $1
            ORDER BY pattern ASC
            "#,
        )
        .bind(query.destination)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Insert a subscription. The primary key rejects duplicates with a
/// unique violation.
pub struct InsertSubscription {
    pub destination: String,
    pub pattern: String,
}

impl Processor<InsertSubscription> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertSubscription")]
    async fn process(&self, insert: InsertSubscription) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO relay_subscriptions (destination, pattern)
            VALUES ($1, $2)
            "#,
        )
        .bind(insert.destination)
        .bind(insert.pattern)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Delete a subscription. Returns the number of rows removed (0 or 1).
pub struct DeleteSubscription {
    pub destination: String,
    pub pattern: String,
}

impl Processor<DeleteSubscription> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteSubscription")]
    async fn process(&self, delete: DeleteSubscription) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM relay_subscriptions
            WHERE destination = $1 AND pattern = $2
            "#,
        )
        .bind(delete.destination)
        .bind(delete.pattern)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
