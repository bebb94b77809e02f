//! Runtime configuration types for the relay.
//!
//! These are the validated values the components run with. Loading and
//! parsing the TOML file is handled by the server crate.

mod admin;
mod broker;
mod discord;
mod router;

pub use admin::AdminConfig;
pub use broker::BrokerConfig;
pub use discord::DiscordConfig;
pub use router::{MAX_IN_FLIGHT, RouterConfig};

/// Every runtime section, as handed from the loader to `main`.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub admin: AdminConfig,
    pub broker: BrokerConfig,
    pub router: RouterConfig,
    pub discord: DiscordConfig,
}
