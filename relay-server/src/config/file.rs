//! TOML file configuration structures.
//!
//! These structs directly map to the `relay-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub broker: BrokerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Broker connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker URL, e.g. `nats://127.0.0.1:4222`.
    pub address: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Omit to retry forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<usize>,
    #[serde(default = "default_health_subject")]
    pub health_subject: String,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_health_subject() -> String {
    "relay.health".to_owned()
}

/// Routing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Treasury/system actor whose events are never rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_address: Option<String>,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            system_address: None,
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_namespace() -> String {
    "structs".to_owned()
}

fn default_max_in_flight() -> usize {
    32
}

/// Chat API section. The bot token comes from `DISCORD_TOKEN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://discord.com/api/v10/".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        relay_core::config::AdminConfig::is_hashed(&self.admin.secret)
    }
}
