//! DiscordSink: posts notifications as chat messages.
//!
//! Each destination is a channel id; a notification becomes one message
//! with a single embed, sent with the bot token.

use super::{NotificationSink, SinkError};
use crate::config::DiscordConfig;
use async_trait::async_trait;
use relay_sdk::objects::discord::CreateMessage;
use relay_sdk::objects::{Destination, RenderedNotification};
use tracing::debug;
use url::Url;

pub struct DiscordSink {
    http_client: reqwest::Client,
    api_base: Url,
    token: String,
}

impl DiscordSink {
    /// Create a new DiscordSink.
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        }
    }

    fn messages_url(&self, destination: &Destination) -> Result<Url, SinkError> {
        let channel = destination.as_str();
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_digit()) {
            return Err(SinkError::InvalidDestination(channel.to_owned()));
        }
        self.api_base
            .join(&format!("channels/{channel}/messages"))
            .map_err(|_| SinkError::InvalidDestination(channel.to_owned()))
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn send(
        &self,
        destination: &Destination,
        notification: &RenderedNotification,
    ) -> Result<(), SinkError> {
        let url = self.messages_url(destination)?;
        let body = CreateMessage::from(notification);

        let response = self
            .http_client
            .post(url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(%destination, title = %notification.title, "Notification delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sink() -> DiscordSink {
        DiscordSink::new(&DiscordConfig {
            api_base: Url::parse("https://discord.com/api/v10/").unwrap(),
            token: "token".to_owned(),
            request_timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn test_messages_url() {
        let url = sink().messages_url(&Destination::new("1203948")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://discord.com/api/v10/channels/1203948/messages"
        );
    }

    #[test]
    fn test_rejects_non_channel_destinations() {
        assert!(matches!(
            sink().messages_url(&Destination::new("../guilds/1")),
            Err(SinkError::InvalidDestination(_))
        ));
        assert!(matches!(
            sink().messages_url(&Destination::new("")),
            Err(SinkError::InvalidDestination(_))
        ));
    }
}
