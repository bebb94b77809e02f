//! Chat API message payloads.
//!
//! A rendered notification is delivered as a message with a single embed.
//! The chat API rejects embeds over its size limits, so conversion truncates
//! instead of failing.

use serde::{Deserialize, Serialize};

use super::RenderedNotification;

pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
pub const MAX_FIELDS: usize = 25;
pub const MAX_FIELD_NAME_CHARS: usize = 256;
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

/// Body of `POST /channels/{channel_id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessage {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl From<&RenderedNotification> for CreateMessage {
    fn from(notification: &RenderedNotification) -> Self {
        let fields = notification
            .fields
            .iter()
            .take(MAX_FIELDS)
            .map(|field| EmbedField {
                name: truncate(&field.label, MAX_FIELD_NAME_CHARS),
                value: truncate(non_blank(&field.value), MAX_FIELD_VALUE_CHARS),
                inline: true,
            })
            .collect();

        let timestamp = notification.timestamp.and_then(|ts| {
            ts.format(&time::format_description::well_known::Rfc3339)
                .ok()
        });

        Self {
            embeds: vec![Embed {
                title: truncate(&notification.title, MAX_TITLE_CHARS),
                description: notification
                    .description
                    .as_deref()
                    .map(|d| truncate(d, MAX_DESCRIPTION_CHARS)),
                fields,
                timestamp,
            }],
        }
    }
}

/// Empty field values are rejected by the chat API.
fn non_blank(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_owned();
    }
    let mut out: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_keeps_fields_in_order() {
        let n = RenderedNotification::new("Capacity Change")
            .field("Previous", "300.00 mW")
            .field("Current", "500.00 mW");
        let msg = CreateMessage::from(&n);
        let embed = &msg.embeds[0];
        assert_eq!(embed.title, "Capacity Change");
        assert_eq!(embed.fields[0].name, "Previous");
        assert_eq!(embed.fields[1].value, "500.00 mW");
        assert!(embed.timestamp.is_none());
    }

    #[test]
    fn test_limits_are_enforced() {
        let mut n = RenderedNotification::new("x".repeat(300)).field("Empty", " ");
        for i in 0..40 {
            n = n.field(format!("f{i}"), "v".repeat(2000));
        }
        let msg = CreateMessage::from(&n);
        let embed = &msg.embeds[0];
        assert_eq!(embed.title.chars().count(), MAX_TITLE_CHARS);
        assert!(embed.title.ends_with("..."));
        assert_eq!(embed.fields.len(), MAX_FIELDS);
        assert_eq!(embed.fields[0].value, "-");
        assert_eq!(embed.fields[1].value.chars().count(), MAX_FIELD_VALUE_CHARS);
    }
}
