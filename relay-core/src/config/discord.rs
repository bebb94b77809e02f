use std::time::Duration;
use url::Url;

/// Chat API delivery settings.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// API root, e.g. `https://discord.com/api/v10/`.
    pub api_base: Url,
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub token: String,
    pub request_timeout: Duration,
}
