//! Admin API request and response types for subscription management.

use serde::{Deserialize, Serialize};

use crate::topic::TopicPattern;

/// `POST /api/v1/admin/destinations/{destination}/subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub pattern: TopicPattern,
}

/// `DELETE /api/v1/admin/destinations/{destination}/subscriptions?pattern=...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSubscriptionQuery {
    pub pattern: TopicPattern,
}

/// One persisted subscription, annotated with its preset name.
///
/// `pattern` is the stored text, which may predate current validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

/// `GET /api/v1/admin/destinations/{destination}/subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    pub destination: String,
    pub subscriptions: Vec<SubscriptionEntry>,
}
