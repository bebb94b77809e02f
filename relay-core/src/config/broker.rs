use std::time::Duration;

/// Connection settings for the event broker.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker URL, e.g. `nats://127.0.0.1:4222`.
    pub address: String,
    /// How long the initial connect may take before startup is aborted.
    pub connect_timeout: Duration,
    /// Transport-level reconnect attempts after a drop. `None` retries forever.
    pub max_reconnect_attempts: Option<usize>,
    /// Subject used for the end-to-end health check subscription.
    pub health_subject: String,
}
