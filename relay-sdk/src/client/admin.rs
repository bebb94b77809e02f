//! Admin API client (command layer → relay server).
//!
//! All requests carry the plaintext admin secret in the
//! `Relay-Admin-Authorization` header.

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::ADMIN_AUTH_HEADER;
use crate::objects::{
    CreateSubscriptionRequest, Destination, ListSubscriptionsResponse, RemoveSubscriptionQuery,
};
use crate::topic::TopicPattern;

/// Typed HTTP client for the relay **Admin API**.
///
/// Authentication uses a plaintext secret verified server-side against an
/// argon2-hashed value.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    admin_secret: String,
}

impl AdminClient {
    /// Create a new `AdminClient`.
    ///
    /// * `base_url` – root URL of the relay server.
    /// * `admin_secret` – the plaintext admin secret.
    pub fn new(base_url: Url, admin_secret: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            admin_secret: admin_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn subscriptions_url(&self, destination: &Destination) -> Result<Url, ClientError> {
        let path = format!(
            "/api/v1/admin/destinations/{}/subscriptions",
            urlencoding::encode(destination.as_str())
        );
        Ok(self.base_url.join(&path)?)
    }

    /// `POST .../subscriptions` – subscribe a destination to a pattern.
    pub async fn subscribe(
        &self,
        destination: &Destination,
        pattern: &TopicPattern,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.subscriptions_url(destination)?)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .json(&CreateSubscriptionRequest {
                pattern: pattern.clone(),
            })
            .send()
            .await?;

        ensure_success(resp).await
    }

    /// `DELETE .../subscriptions?pattern=...` – remove a subscription.
    pub async fn unsubscribe(
        &self,
        destination: &Destination,
        pattern: &TopicPattern,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.subscriptions_url(destination)?)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(&RemoveSubscriptionQuery {
                pattern: pattern.clone(),
            })
            .send()
            .await?;

        ensure_success(resp).await
    }

    /// `GET .../subscriptions` – list persisted subscriptions.
    pub async fn list(
        &self,
        destination: &Destination,
    ) -> Result<ListSubscriptionsResponse, ClientError> {
        let resp = self
            .http
            .get(self.subscriptions_url(destination)?)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;

        parse_response(resp).await
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<(), ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(())
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
