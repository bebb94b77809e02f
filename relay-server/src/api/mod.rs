//! HTTP API: the admin surface over the subscription registry.

pub mod admin;
pub mod extractors;
