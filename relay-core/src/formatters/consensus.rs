//! New block notices.

use super::units::PLACEHOLDER;
use crate::events::InboundEvent;
use relay_sdk::objects::RenderedNotification;

pub fn render(event: &InboundEvent) -> RenderedNotification {
    let payload = &event.payload;
    RenderedNotification::new("New Block")
        .field(
            "Height",
            payload.text("height").unwrap_or_else(|| PLACEHOLDER.to_owned()),
        )
        .field_opt("Transactions", payload.text("tx_count"))
        .field_opt("Proposer", payload.text("proposer"))
}
