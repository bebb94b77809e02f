//! Shared types for the event-subscription relay.
//!
//! Everything here is plain data: topic patterns and their matching rules,
//! the named subscription presets, rendered notifications and the request
//! and response bodies of the admin API. The HTTP client for that API lives
//! behind the `client` feature.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod presets;
pub mod topic;

/// Header name for admin API authentication (plaintext secret).
pub const ADMIN_AUTH_HEADER: &str = "Relay-Admin-Authorization";
