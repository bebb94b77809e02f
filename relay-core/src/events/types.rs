//! Inbound message and event types.

use bytes::Bytes;
use relay_sdk::objects::Destination;
use relay_sdk::topic::TopicPattern;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Payload fields checked, in order, for the event timestamp.
const TIMESTAMP_FIELDS: &[&str] = &["updated_at", "created_at", "time", "timestamp", "block_time"];

/// Identity of one live subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionKey {
    pub destination: Destination,
    pub pattern: TopicPattern,
}

impl SubscriptionKey {
    pub fn new(destination: Destination, pattern: TopicPattern) -> Self {
        Self {
            destination,
            pattern,
        }
    }
}

/// A raw message as delivered by the broker.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Bytes,
}

/// A broker message tagged with the subscription it arrived on.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Correlates log lines for this message.
    pub id: Uuid,
    pub subscription: SubscriptionKey,
    pub message: InboundMessage,
}

impl Delivery {
    pub fn new(subscription: SubscriptionKey, message: InboundMessage) -> Self {
        Self {
            id: Uuid::now_v7(),
            subscription,
            message,
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// A parsed payload: a loosely-typed JSON object.
///
/// Accessors never fail; absent, null or ill-typed fields read as `None`
/// so formatters can render partial data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(PayloadError::NotAnObject),
        }
    }

    /// Non-empty text value. Numbers and booleans are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric value from a JSON number or a numeric string.
    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        let raw = match self.0.get(key)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_owned(),
            _ => return None,
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .ok()
    }

    /// The `category` discriminator, if present and non-empty.
    pub fn category(&self) -> Option<String> {
        self.text("category")
    }

    /// First timestamp field that parses as RFC 3339 or unix seconds.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        TIMESTAMP_FIELDS
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(parse_timestamp)
    }

    /// Top-level scalar fields in key order, skipping `category`.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().filter_map(|(key, value)| {
            if key == "category" {
                return None;
            }
            let rendered = match value {
                Value::String(s) if !s.trim().is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.as_str(), rendered))
        })
    }
}

fn parse_timestamp(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::String(s) => OffsetDateTime::parse(s, &Rfc3339)
            .ok()
            .or_else(|| s.parse::<i64>().ok().and_then(from_unix)),
        Value::Number(n) => n.as_i64().and_then(from_unix),
        _ => None,
    }
}

fn from_unix(seconds: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(seconds).ok()
}

/// A parsed inbound event, alive only for the duration of dispatch.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub topic: String,
    pub payload: Payload,
}

impl InboundEvent {
    pub fn parse(message: &InboundMessage) -> Result<Self, PayloadError> {
        Ok(Self {
            topic: message.topic.clone(),
            payload: Payload::parse(&message.payload)?,
        })
    }

    /// Last segment of the topic.
    pub fn leaf_segment(&self) -> &str {
        self.topic.rsplit('.').next().unwrap_or(&self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn payload(json: &str) -> Payload {
        Payload::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(Payload::parse(b"[1,2]"), Err(PayloadError::NotAnObject)));
        assert!(matches!(Payload::parse(b"{oops"), Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        let p = payload(r#"{"a": 500, "b": "1250000", "c": 1.5, "d": "n/a", "e": null}"#);
        assert_eq!(p.decimal("a"), Some(dec("500")));
        assert_eq!(p.decimal("b"), Some(dec("1250000")));
        assert_eq!(p.decimal("c"), Some(dec("1.5")));
        assert_eq!(p.decimal("d"), None);
        assert_eq!(p.decimal("e"), None);
        assert_eq!(p.decimal("missing"), None);
    }

    #[test]
    fn test_null_category_reads_as_none() {
        assert_eq!(payload(r#"{"category": null}"#).category(), None);
        assert_eq!(payload(r#"{"category": ""}"#).category(), None);
        assert_eq!(
            payload(r#"{"category": "sent"}"#).category().as_deref(),
            Some("sent")
        );
    }

    #[test]
    fn test_timestamp_sources() {
        let rfc = payload(r#"{"updated_at": "2024-05-01T12:00:00Z"}"#);
        assert_eq!(rfc.timestamp().unwrap().unix_timestamp(), 1_714_564_800);

        let unix = payload(r#"{"time": 1714564800}"#);
        assert_eq!(unix.timestamp().unwrap().unix_timestamp(), 1_714_564_800);

        let fallback = payload(r#"{"updated_at": "garbage", "block_time": "1714564800"}"#);
        assert_eq!(fallback.timestamp().unwrap().unix_timestamp(), 1_714_564_800);

        assert!(payload("{}").timestamp().is_none());
    }

    #[test]
    fn test_leaf_segment() {
        let event = InboundEvent {
            topic: "ns.grid.1-4.capacity".to_owned(),
            payload: Payload::default(),
        };
        assert_eq!(event.leaf_segment(), "capacity");
    }
}
