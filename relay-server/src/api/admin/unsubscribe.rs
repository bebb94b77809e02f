use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use relay_sdk::objects::{Destination, RemoveSubscriptionQuery};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `DELETE /destinations/{destination}/subscriptions?pattern=…` - stop and
/// forget a subscription. Removing an unknown pair still returns 204.
pub async fn unsubscribe(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(destination): Path<String>,
    query: Result<Query<RemoveSubscriptionQuery>, QueryRejection>,
) -> Result<StatusCode, AdminApiError> {
    let Query(query) = query.map_err(|e| AdminApiError::InvalidRequest(e.body_text()))?;

    state
        .registry
        .remove(Destination::from(destination), query.pattern)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
