use axum::{
    Json,
    extract::{Path, State},
};
use relay_sdk::objects::{Destination, ListSubscriptionsResponse, SubscriptionEntry};
use relay_sdk::presets::preset_name;
use relay_sdk::topic::TopicPattern;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `GET /destinations/{destination}/subscriptions` - stored patterns for a
/// destination, ordered by pattern and annotated with preset names.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(destination): Path<String>,
) -> Result<Json<ListSubscriptionsResponse>, AdminApiError> {
    let patterns = state
        .registry
        .list(&Destination::from(destination.as_str()))
        .await?;

    let subscriptions = patterns
        .into_iter()
        .map(|pattern| SubscriptionEntry {
            preset: TopicPattern::new(pattern.as_str())
                .ok()
                .and_then(|valid| preset_name(&state.namespace, &valid)),
            pattern,
        })
        .collect();

    Ok(Json(ListSubscriptionsResponse {
        destination,
        subscriptions,
    }))
}
