//! Database query objects.
//!
//! `subscription` owns the relay's one table. `display_name` reads the
//! domain database to turn ids into names for notifications.

pub mod display_name;
pub mod subscription;
