//! Application state shared across all request handlers.

use relay_core::config::AdminConfig;
use relay_core::registry::SubscriptionRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// The live subscription set and its store.
    pub registry: Arc<SubscriptionRegistry>,
    /// Admin secret hash (can be reloaded via SIGHUP).
    pub admin: Arc<RwLock<AdminConfig>>,
    /// Topic namespace, used to name presets.
    pub namespace: Arc<str>,
}

impl AppState {
    pub fn new(registry: Arc<SubscriptionRegistry>, admin: AdminConfig, namespace: &str) -> Self {
        Self {
            registry,
            admin: Arc::new(RwLock::new(admin)),
            namespace: Arc::from(namespace),
        }
    }

    /// Replace the admin configuration (used during SIGHUP reload).
    pub async fn update_admin(&self, admin: AdminConfig) {
        *self.admin.write().await = admin;
    }
}
