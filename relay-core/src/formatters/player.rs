//! Player state, profile and address registration.

use super::humanize;
use super::units::Unit;
use crate::events::InboundEvent;
use crate::lookup::{NameResolver, display_guild, display_player};
use relay_sdk::objects::RenderedNotification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCategory {
    Consensus,
    Meta,
    Address,
    Other(String),
}

impl PlayerCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "player_consensus" => Self::Consensus,
            "player_meta" => Self::Meta,
            "player_address" => Self::Address,
            other => Self::Other(other.to_owned()),
        }
    }
}

pub async fn render(
    category: &PlayerCategory,
    event: &InboundEvent,
    resolver: &dyn NameResolver,
) -> RenderedNotification {
    let payload = &event.payload;
    let player_id = payload.text("player_id");

    match category {
        PlayerCategory::Meta => {
            // The event itself carries the new name; the lookup table may lag.
            let username = payload.text("username");
            let player = match (&username, &player_id) {
                (Some(name), Some(id)) => Some(format!("{name} ({id})")),
                (None, Some(id)) => Some(display_player(resolver, id).await),
                (_, None) => None,
            };
            RenderedNotification::new("Player Profile Updated")
                .field_opt("Player", player)
                .field_opt("Username", username)
        }
        PlayerCategory::Consensus => {
            let player = match &player_id {
                Some(id) => Some(display_player(resolver, id).await),
                None => None,
            };
            let guild = match payload.text("guild_id") {
                Some(id) => Some(display_guild(resolver, &id).await),
                None => None,
            };
            RenderedNotification::new("Player Updated")
                .field_opt("Player", player)
                .field_opt("Guild", guild)
                .field_opt("Planet", payload.text("planet_id"))
                .field("Ore", Unit::grams().format_opt(payload.decimal("ore")))
        }
        PlayerCategory::Address => {
            let player = match &player_id {
                Some(id) => Some(display_player(resolver, id).await),
                None => None,
            };
            let title = match payload.text("status") {
                Some(status) => format!("Player Address {}", humanize(&status)),
                None => "Player Address Registered".to_owned(),
            };
            RenderedNotification::new(title)
                .field_opt("Player", player)
                .field_opt("Address", payload.text("address"))
                .field_opt("Permissions", payload.text("permissions"))
        }
        PlayerCategory::Other(other) => {
            let player = match &player_id {
                Some(id) => Some(display_player(resolver, id).await),
                None => None,
            };
            RenderedNotification::new(format!("Player {}", humanize(other))).field_opt("Player", player)
        }
    }
}
