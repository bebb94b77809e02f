/// Largest accepted `max_in_flight`.
pub const MAX_IN_FLIGHT: usize = 4096;

/// Settings for classifying and dispatching inbound messages.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// First topic segment shared by all domain topics.
    pub namespace: String,
    /// Actor address whose events are never rendered (system/treasury).
    pub system_address: Option<String>,
    /// Upper bound on messages rendered and delivered concurrently.
    pub max_in_flight: usize,
}

impl RouterConfig {
    pub fn is_system_address(&self, address: &str) -> bool {
        self.system_address.as_deref() == Some(address)
    }
}
