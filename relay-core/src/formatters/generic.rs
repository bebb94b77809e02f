//! Fallback rendering for alerts, warnings, info and anything unrecognized.

use super::humanize;
use crate::events::InboundEvent;
use relay_sdk::objects::RenderedNotification;

/// Payload fields holding free text, in order of preference.
const MESSAGE_FIELDS: &[&str] = &["message", "text", "description"];

/// Scalar fields shown when a payload has no free text.
const MAX_SCALAR_FIELDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericLevel {
    Alert,
    Warning,
    Info,
    Other(Option<String>),
}

impl GenericLevel {
    pub fn parse(category: Option<&str>) -> Self {
        match category {
            Some("alert") => Self::Alert,
            Some("warning") => Self::Warning,
            Some("info") => Self::Info,
            other => Self::Other(other.map(str::to_owned)),
        }
    }

    /// Categories that always render generically, whatever the topic.
    pub fn is_level(category: &str) -> bool {
        matches!(category, "alert" | "warning" | "info")
    }

    fn title(&self) -> String {
        match self {
            Self::Alert => "Alert".to_owned(),
            Self::Warning => "Warning".to_owned(),
            Self::Info => "Info".to_owned(),
            Self::Other(Some(category)) => humanize(category),
            Self::Other(None) => "Update".to_owned(),
        }
    }
}

pub fn render(level: &GenericLevel, event: &InboundEvent) -> RenderedNotification {
    let payload = &event.payload;
    let notification = RenderedNotification::new(level.title());

    let message = MESSAGE_FIELDS.iter().find_map(|key| payload.text(key));
    let notification = match message {
        Some(message) => notification.description(message),
        None => payload
            .scalars()
            .take(MAX_SCALAR_FIELDS)
            .fold(notification, |n, (key, value)| n.field(humanize(key), value)),
    };
    notification.field("Topic", event.topic.as_str())
}
