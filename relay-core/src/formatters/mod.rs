//! Formatters: one family per event category.
//!
//! Each family turns an [`InboundEvent`] into a [`RenderedNotification`].
//! Formatters never fail; missing fields render as [`units::PLACEHOLDER`]
//! or are left out, and name lookups fall back to raw ids.

pub mod consensus;
pub mod generic;
pub mod grid;
pub mod guild;
pub mod inventory;
pub mod planet;
pub mod player;
pub mod provider;
pub mod units;

use crate::events::InboundEvent;
use crate::lookup::NameResolver;
use relay_sdk::objects::RenderedNotification;

pub use generic::GenericLevel;
pub use guild::GuildCategory;
pub use inventory::InventoryCategory;
pub use planet::PlanetCategory;
pub use player::PlayerCategory;

/// The formatter family selected for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Grid,
    Planet(PlanetCategory),
    Guild(GuildCategory),
    Inventory(InventoryCategory),
    Player(PlayerCategory),
    Provider,
    Consensus,
    Generic(GenericLevel),
}

/// Render `event` with the formatter for `route`.
pub async fn render(
    route: &Route,
    event: &InboundEvent,
    resolver: &dyn NameResolver,
) -> RenderedNotification {
    let notification = match route {
        Route::Grid => grid::render(event),
        Route::Planet(category) => planet::render(category, event, resolver).await,
        Route::Guild(category) => guild::render(category, event, resolver).await,
        Route::Inventory(category) => inventory::render(category, event, resolver).await,
        Route::Player(category) => player::render(category, event, resolver).await,
        Route::Provider => provider::render(event, resolver).await,
        Route::Consensus => consensus::render(event),
        Route::Generic(level) => generic::render(level, event),
    };
    notification.timestamp(event.payload.timestamp())
}

/// `"connection_capacity"` -> `"Connection Capacity"`.
pub fn humanize(raw: &str) -> String {
    raw.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::events::{InboundEvent, Payload};

    pub fn event(topic: &str, json: &str) -> InboundEvent {
        InboundEvent {
            topic: topic.to_owned(),
            payload: Payload::parse(json.as_bytes()).unwrap(),
        }
    }
}
