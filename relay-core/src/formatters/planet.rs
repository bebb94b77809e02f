//! Planet activity: fleet movements and raids.

use super::humanize;
use super::units::Unit;
use crate::events::InboundEvent;
use crate::lookup::{NameResolver, display_player};
use relay_sdk::objects::RenderedNotification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanetCategory {
    FleetArrive,
    FleetDepart,
    RaidStatus,
    Other(String),
}

impl PlanetCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "fleet_arrive" => Self::FleetArrive,
            "fleet_depart" => Self::FleetDepart,
            "raid_status" => Self::RaidStatus,
            other => Self::Other(other.to_owned()),
        }
    }
}

pub async fn render(
    category: &PlanetCategory,
    event: &InboundEvent,
    resolver: &dyn NameResolver,
) -> RenderedNotification {
    let payload = &event.payload;
    let player = match payload.text("player_id") {
        Some(id) => Some(display_player(resolver, &id).await),
        None => None,
    };

    let title = match category {
        PlanetCategory::FleetArrive => "Fleet Arrived".to_owned(),
        PlanetCategory::FleetDepart => "Fleet Departed".to_owned(),
        PlanetCategory::RaidStatus => match payload.text("status") {
            Some(status) => format!("Raid {}", humanize(status.trim_start_matches("raid_"))),
            None => "Raid Update".to_owned(),
        },
        PlanetCategory::Other(other) => format!("Planet {}", humanize(other)),
    };

    let notification = RenderedNotification::new(title)
        .field_opt("Planet", payload.text("planet_id"))
        .field_opt("Fleet", payload.text("fleet_id"));

    match category {
        PlanetCategory::FleetArrive => notification.field_opt("Commander", player),
        PlanetCategory::FleetDepart => notification
            .field_opt("Commander", player)
            .field_opt("Heading To", payload.text("destination_planet_id")),
        PlanetCategory::RaidStatus => notification
            .field_opt("Raider", player)
            .field_opt("Status", payload.text("status").map(|s| humanize(&s)))
            .field("Ore Stolen", Unit::grams().format_opt(payload.decimal("ore_stolen"))),
        PlanetCategory::Other(_) => notification.field_opt("Player", player),
    }
}
