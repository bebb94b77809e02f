//! Category selection and suppression rules.

use crate::config::RouterConfig;
use crate::events::InboundEvent;
use crate::formatters::inventory::is_refine_credit;
use crate::formatters::{
    GenericLevel, GuildCategory, InventoryCategory, PlanetCategory, PlayerCategory, Route,
};
use relay_sdk::topic::domain_segment;

/// Why an event was deliberately not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The actor is the configured system address.
    SystemActor,
    /// The alpha-credit half of a refine; the ore debit is rendered instead.
    RefineCredit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Render(Route),
    Suppressed(SuppressReason),
}

pub fn classify(config: &RouterConfig, event: &InboundEvent) -> Classification {
    let payload = &event.payload;
    if payload
        .text("address")
        .is_some_and(|address| config.is_system_address(&address))
    {
        return Classification::Suppressed(SuppressReason::SystemActor);
    }

    let domain = domain_segment(&event.topic, &config.namespace);
    let category = payload.category();
    let specific = category
        .as_deref()
        .filter(|category| !GenericLevel::is_level(category));

    let route = match (domain, specific) {
        ("guild", Some(category)) => Route::Guild(GuildCategory::parse(category)),
        ("player", Some(category)) => Route::Player(PlayerCategory::parse(category)),
        ("planet", Some(category)) => Route::Planet(PlanetCategory::parse(category)),
        ("inventory", Some(category)) => {
            let category = InventoryCategory::parse(category);
            if category == InventoryCategory::Refined && is_refine_credit(payload) {
                return Classification::Suppressed(SuppressReason::RefineCredit);
            }
            Route::Inventory(category)
        }
        ("grid", _) => Route::Grid,
        ("provider", _) => Route::Provider,
        ("consensus" | "block", _) => Route::Consensus,
        _ => Route::Generic(GenericLevel::parse(category.as_deref())),
    };
    Classification::Render(route)
}
