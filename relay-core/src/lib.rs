#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod broker;
pub mod config;
pub mod connection;
pub mod entities;
pub mod events;
pub mod formatters;
pub mod framework;
pub mod lookup;
pub mod registry;
pub mod router;
pub mod sink;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
