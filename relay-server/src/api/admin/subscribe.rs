use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use relay_sdk::objects::{CreateSubscriptionRequest, Destination, SubscriptionEntry};
use relay_sdk::presets::preset_name;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /destinations/{destination}/subscriptions` - subscribe a destination
/// to a topic pattern.
///
/// The record is persisted before the broker subscription is created. Fails
/// with 503 while the broker is disconnected and 409 if the pair exists.
pub async fn subscribe(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(destination): Path<String>,
    body: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AdminApiError> {
    let Json(request) = body.map_err(|e| AdminApiError::InvalidRequest(e.body_text()))?;
    let pattern = request.pattern;

    state
        .registry
        .add(Destination::from(destination), pattern.clone())
        .await?;

    let preset = preset_name(&state.namespace, &pattern);
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionEntry {
            pattern: pattern.to_string(),
            preset,
        }),
    ))
}
