//! Ledger movements on a player's inventory.

use super::humanize;
use super::units::Unit;
use crate::events::{InboundEvent, Payload};
use crate::lookup::{NameResolver, display_address};
use relay_sdk::objects::RenderedNotification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCategory {
    Sent,
    Received,
    Seized,
    Forfeited,
    Mined,
    Refined,
    Infused,
    Defused,
    Minted,
    Burned,
    Other(String),
}

impl InventoryCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "sent" => Self::Sent,
            "received" => Self::Received,
            "seized" => Self::Seized,
            "forfeited" => Self::Forfeited,
            "mined" => Self::Mined,
            "refined" => Self::Refined,
            "infused" => Self::Infused,
            "defused" => Self::Defused,
            "minted" => Self::Minted,
            "burned" => Self::Burned,
            other => Self::Other(other.to_owned()),
        }
    }

    fn title(&self) -> String {
        match self {
            Self::Sent => "Transfer Sent".to_owned(),
            Self::Received => "Transfer Received".to_owned(),
            Self::Seized => "Assets Seized".to_owned(),
            Self::Forfeited => "Assets Forfeited".to_owned(),
            Self::Mined => "Ore Mined".to_owned(),
            Self::Refined => "Ore Refined".to_owned(),
            Self::Infused => "Alpha Infused".to_owned(),
            Self::Defused => "Alpha Defused".to_owned(),
            Self::Minted => "Tokens Minted".to_owned(),
            Self::Burned => "Tokens Burned".to_owned(),
            Self::Other(other) => format!("Inventory {}", humanize(other)),
        }
    }
}

/// Whether a refine payload is the credit side (alpha produced) of the
/// transaction. Without an explicit `direction`, anything other than the
/// ore debit counts as credit.
pub fn is_refine_credit(payload: &Payload) -> bool {
    match payload.text("direction").as_deref() {
        Some(direction) => direction.eq_ignore_ascii_case("credit"),
        None => payload
            .text("denom")
            .is_some_and(|denom| denom != "ore"),
    }
}

pub async fn render(
    category: &InventoryCategory,
    event: &InboundEvent,
    resolver: &dyn NameResolver,
) -> RenderedNotification {
    let payload = &event.payload;
    let player = match payload.text("address") {
        Some(address) => Some(display_address(resolver, &address).await),
        None => None,
    };
    let counterparty = match payload.text("counterparty") {
        Some(address) => Some(display_address(resolver, &address).await),
        None => None,
    };
    let unit = Unit::for_denom(payload.text("denom").as_deref().unwrap_or_default());
    let amount_label = match category {
        InventoryCategory::Refined => "Ore Consumed",
        _ => "Amount",
    };
    let counterparty_label = match category {
        InventoryCategory::Sent => "To",
        InventoryCategory::Received => "From",
        InventoryCategory::Seized => "Seized By",
        _ => "Counterparty",
    };

    RenderedNotification::new(category.title())
        .field_opt("Player", player)
        .field(amount_label, unit.format_opt(payload.decimal("amount")))
        .field_opt(counterparty_label, counterparty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::test_support::event;
    use crate::formatters::units::PLACEHOLDER;
    use crate::testing::StaticResolver;

    #[tokio::test]
    async fn test_sent_resolves_both_sides() {
        let resolver = StaticResolver::default()
            .player("1-7", "Vela")
            .address("structs1vela", "1-7");
        let rendered = render(
            &InventoryCategory::Sent,
            &event(
                "structs.inventory.ualpha.1-7",
                r#"{"category": "sent", "address": "structs1vela", "counterparty": "structs1other", "amount": 3000000, "denom": "ualpha"}"#,
            ),
            &resolver,
        )
        .await;
        assert_eq!(rendered.title, "Transfer Sent");
        assert_eq!(rendered.field_value("Player"), Some("Vela (1-7)"));
        assert_eq!(rendered.field_value("Amount"), Some("3.00 alpha"));
        assert_eq!(rendered.field_value("To"), Some("structs1other"));
    }

    #[tokio::test]
    async fn test_refine_debit_in_grams() {
        let rendered = render(
            &InventoryCategory::Refined,
            &event(
                "structs.inventory.ore.1-7",
                r#"{"category": "refined", "amount": "5000", "denom": "ore", "direction": "debit"}"#,
            ),
            &StaticResolver::default(),
        )
        .await;
        assert_eq!(rendered.title, "Ore Refined");
        assert_eq!(rendered.field_value("Ore Consumed"), Some("5.00 kg"));
    }

    #[tokio::test]
    async fn test_missing_amount() {
        let rendered = render(
            &InventoryCategory::Mined,
            &event("structs.inventory.ore.1-7", r#"{"category": "mined"}"#),
            &StaticResolver::default(),
        )
        .await;
        assert_eq!(rendered.field_value("Amount"), Some(PLACEHOLDER));
    }

    #[test]
    fn test_refine_credit_detection() {
        let credit = event("t", r#"{"direction": "credit", "denom": "ore"}"#);
        let debit = event("t", r#"{"direction": "debit", "denom": "ualpha"}"#);
        let implied_credit = event("t", r#"{"denom": "ualpha"}"#);
        let implied_debit = event("t", r#"{"denom": "ore"}"#);
        assert!(is_refine_credit(&credit.payload));
        assert!(!is_refine_credit(&debit.payload));
        assert!(is_refine_credit(&implied_credit.payload));
        assert!(!is_refine_credit(&implied_debit.payload));
        assert!(!is_refine_credit(&event("t", "{}").payload));
    }
}
