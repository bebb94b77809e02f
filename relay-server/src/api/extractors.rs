//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminAuth`, which checks the `Relay-Admin-Authorization` header
//! against the argon2 hash of the admin secret.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use relay_sdk::ADMIN_AUTH_HEADER;

use crate::state::AppState;

/// Proof that the request carried the admin secret.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("missing Relay-Admin-Authorization header")]
    MissingHeader,
    #[error("invalid Relay-Admin-Authorization header")]
    InvalidHeader,
    #[error("admin secret mismatch")]
    Unauthorized,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::MissingHeader => (
                StatusCode::UNAUTHORIZED,
                "missing Relay-Admin-Authorization header",
            ),
            AdminAuthError::InvalidHeader => (
                StatusCode::BAD_REQUEST,
                "invalid Relay-Admin-Authorization header",
            ),
            AdminAuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let admin = state.admin.read().await;
        if admin.verify_secret(secret) {
            Ok(AdminAuth)
        } else {
            tracing::warn!("Rejected admin request with wrong secret");
            Err(AdminAuthError::Unauthorized)
        }
    }
}
