//! Admin API handlers.
//!
//! These endpoints are called by operators (or a chat command layer) and
//! require the `Relay-Admin-Authorization` header with the plaintext admin
//! secret.
//!
//! # Endpoints
//!
//! - `POST   /destinations/{destination}/subscriptions`           – subscribe a destination
//! - `DELETE /destinations/{destination}/subscriptions?pattern=…` – unsubscribe (idempotent)
//! - `GET    /destinations/{destination}/subscriptions`           – list stored patterns

use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use relay_core::registry::RegistryError;
use relay_core::store::StoreError;

use crate::state::AppState;

mod list_subscriptions;
mod subscribe;
mod unsubscribe;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/destinations/{destination}/subscriptions",
        get(list_subscriptions::list_subscriptions)
            .post(subscribe::subscribe)
            .delete(unsubscribe::unsubscribe),
    )
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    InvalidRequest(String),
    Registry(RegistryError),
}

impl From<RegistryError> for AdminApiError {
    fn from(e: RegistryError) -> Self {
        AdminApiError::Registry(e)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            AdminApiError::Registry(RegistryError::NotConnected) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "broker is not connected, try again later",
            )
                .into_response(),
            AdminApiError::Registry(RegistryError::Store(StoreError::Duplicate { .. })) => {
                (StatusCode::CONFLICT, "subscription already exists").into_response()
            }
            AdminApiError::Registry(e @ RegistryError::Subscribe(_)) => {
                tracing::error!(error = %e, "Admin API: broker subscribe failed");
                (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
            }
            AdminApiError::Registry(RegistryError::Store(e)) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use axum::body::Body;
    use axum::http::{Method, Request, Response};
    use relay_core::broker::Broker;
    use relay_core::config::AdminConfig;
    use relay_core::events::delivery_channel;
    use relay_core::registry::SubscriptionRegistry;
    use relay_core::store::SubscriptionStore;
    use relay_core::testing::{MemoryBroker, MemoryStore};
    use relay_sdk::ADMIN_AUTH_HEADER;
    use relay_sdk::objects::ListSubscriptionsResponse;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "relay-admin";
    const BASE: &str = "/api/v1/admin/destinations/1203948/subscriptions";

    struct Harness {
        app: Router,
        broker: Arc<MemoryBroker>,
        store: Arc<MemoryStore>,
    }

    fn harness() -> Harness {
        let broker = Arc::new(MemoryBroker::new());
        let store = Arc::new(MemoryStore::new());
        let (delivery_tx, _delivery_rx) = delivery_channel();
        let registry = Arc::new(SubscriptionRegistry::new(
            Arc::clone(&broker) as Arc<dyn Broker>,
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            delivery_tx,
        ));

        let state = AppState::new(
            registry,
            AdminConfig::from_plaintext(SECRET).unwrap(),
            "ns",
        );

        Harness {
            app: build_router(state),
            broker,
            store,
        }
    }

    fn request(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ADMIN_AUTH_HEADER, SECRET);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn create(pattern: &str) -> Request<Body> {
        request(
            Method::POST,
            BASE,
            Some(&format!(r#"{{"pattern": "{pattern}"}}"#)),
        )
    }

    #[tokio::test]
    async fn test_subscribe_list_unsubscribe() {
        let h = harness();

        let created = send(&h.app, create("ns.grid.>")).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = send(&h.app, create("ns.guild.0-3.>")).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = send(&h.app, request(Method::GET, BASE, None)).await;
        assert_eq!(listed.status(), StatusCode::OK);
        let listed: ListSubscriptionsResponse =
            serde_json::from_str(&body_text(listed).await).unwrap();
        assert_eq!(listed.destination, "1203948");
        let entries: Vec<_> = listed
            .subscriptions
            .iter()
            .map(|entry| (entry.pattern.to_string(), entry.preset.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("ns.grid.>".to_owned(), Some("Grid updates".to_owned())),
                ("ns.guild.0-3.>".to_owned(), Some("Guild 0-3 updates".to_owned())),
            ]
        );

        let removed = send(
            &h.app,
            request(Method::DELETE, &format!("{BASE}?pattern=ns.grid.%3E"), None),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);
        assert_eq!(h.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let h = harness();
        assert_eq!(send(&h.app, create("ns.>")).await.status(), StatusCode::CREATED);
        assert_eq!(send(&h.app, create("ns.>")).await.status(), StatusCode::CONFLICT);
        assert_eq!(h.broker.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_bad_request() {
        let h = harness();
        for pattern in ["ns.*.grid", "ns..grid", "ns.>.grid", ""] {
            let response = send(&h.app, create(pattern)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{pattern}");
        }
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_is_unavailable() {
        let h = harness();
        h.broker.set_connected(false);
        let response = send(&h.app, create("ns.>")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_is_no_content() {
        let h = harness();
        let response = send(
            &h.app,
            request(Method::DELETE, &format!("{BASE}?pattern=ns.player.%3E"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_wrong_or_missing_secret_is_unauthorized() {
        let h = harness();
        let wrong = Request::builder()
            .uri(BASE)
            .header(ADMIN_AUTH_HEADER, "nope")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&h.app, wrong).await.status(), StatusCode::UNAUTHORIZED);

        let missing = Request::builder().uri(BASE).body(Body::empty()).unwrap();
        assert_eq!(send(&h.app, missing).await.status(), StatusCode::UNAUTHORIZED);
    }
}
