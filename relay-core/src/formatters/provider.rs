//! Energy provider listings.

use super::humanize;
use super::units::{PLACEHOLDER, Unit};
use crate::events::InboundEvent;
use crate::lookup::{NameResolver, display_player};
use relay_sdk::objects::RenderedNotification;

pub async fn render(event: &InboundEvent, resolver: &dyn NameResolver) -> RenderedNotification {
    let payload = &event.payload;
    let title = match payload.category() {
        Some(category) => format!(
            "Provider {}",
            humanize(category.trim_start_matches("provider_"))
        ),
        None => "Provider Update".to_owned(),
    };
    let owner = match payload.text("owner") {
        Some(id) => Some(display_player(resolver, &id).await),
        None => None,
    };

    let rate_unit = Unit::for_denom(payload.text("rate_denom").as_deref().unwrap_or_default());
    let rate = payload
        .decimal("rate_amount")
        .map(|amount| format!("{} per block", rate_unit.format(amount)));

    let energy = Unit::milliwatts();
    let capacity = match (
        payload.decimal("capacity_minimum"),
        payload.decimal("capacity_maximum"),
    ) {
        (None, None) => PLACEHOLDER.to_owned(),
        (minimum, maximum) => format!(
            "{} to {}",
            energy.format_opt(minimum),
            energy.format_opt(maximum)
        ),
    };

    RenderedNotification::new(title)
        .field_opt("Provider", payload.text("provider_id"))
        .field_opt("Owner", owner)
        .field("Rate", rate.unwrap_or_else(|| PLACEHOLDER.to_owned()))
        .field("Capacity", capacity)
        .field_opt("Status", payload.text("status").map(|s| humanize(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::test_support::event;
    use crate::testing::StaticResolver;

    #[tokio::test]
    async fn test_provider_listing() {
        let resolver = StaticResolver::default().player("1-7", "Vela");
        let rendered = render(
            &event(
                "structs.provider.10-4",
                r#"{"provider_id": "10-4", "owner": "1-7", "rate_amount": "1500", "rate_denom": "ualpha",
                    "capacity_minimum": 1000, "capacity_maximum": 2000000, "status": "active"}"#,
            ),
            &resolver,
        )
        .await;
        assert_eq!(rendered.title, "Provider Update");
        assert_eq!(rendered.field_value("Owner"), Some("Vela (1-7)"));
        assert_eq!(rendered.field_value("Rate"), Some("1.50 malpha per block"));
        assert_eq!(rendered.field_value("Capacity"), Some("1.00 W to 2.00 kW"));
        assert_eq!(rendered.field_value("Status"), Some("Active"));
    }

    #[tokio::test]
    async fn test_partial_provider() {
        let rendered = render(
            &event("structs.provider.10-4", r#"{"category": "provider_open", "capacity_maximum": 5}"#),
            &StaticResolver::default(),
        )
        .await;
        assert_eq!(rendered.title, "Provider Open");
        assert_eq!(rendered.field_value("Rate"), Some(PLACEHOLDER));
        assert_eq!(rendered.field_value("Capacity"), Some("N/A to 5.00 mW"));
    }
}
