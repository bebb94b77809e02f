//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        // Admin API
        .nest("/api/v1/admin", api::admin::router())
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Ready check response.
#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    broker: &'static str,
    live_subscriptions: usize,
}

/// Ready only while the broker connection is up.
async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let connected = state.registry.is_connected();
    let live_subscriptions = state.registry.live_count().await;
    let (status, body) = if connected {
        (
            StatusCode::OK,
            ReadyResponse {
                status: "ready",
                broker: "connected",
                live_subscriptions,
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            ReadyResponse {
                status: "not_ready",
                broker: "disconnected",
                live_subscriptions,
            },
        )
    };
    (status, Json(body))
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use relay_core::broker::Broker;
    use relay_core::config::AdminConfig;
    use relay_core::events::delivery_channel;
    use relay_core::registry::SubscriptionRegistry;
    use relay_core::store::SubscriptionStore;
    use relay_core::testing::{MemoryBroker, MemoryStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(broker: Arc<MemoryBroker>) -> Router {
        let (delivery_tx, _delivery_rx) = delivery_channel();
        let registry = Arc::new(SubscriptionRegistry::new(
            broker as Arc<dyn Broker>,
            Arc::new(MemoryStore::new()) as Arc<dyn SubscriptionStore>,
            delivery_tx,
        ));
        build_router(AppState::new(
            registry,
            AdminConfig::new(String::new()),
            "ns",
        ))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(Arc::new(MemoryBroker::new())), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_follows_broker_connectivity() {
        let broker = Arc::new(MemoryBroker::new());
        let (status, body) = get_json(app(Arc::clone(&broker)), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["live_subscriptions"], 0);

        broker.set_connected(false);
        let (status, body) = get_json(app(broker), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["broker"], "disconnected");
    }
}
