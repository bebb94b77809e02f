//! Grid attribute changes: capacity, load, ore, fuel and friends.

use super::humanize;
use super::units::{PLACEHOLDER, Unit};
use crate::events::InboundEvent;
use relay_sdk::objects::RenderedNotification;

pub fn render(event: &InboundEvent) -> RenderedNotification {
    let payload = &event.payload;
    let attribute = payload
        .category()
        .unwrap_or_else(|| event.leaf_segment().to_owned());
    let unit = Unit::for_attribute(&attribute);

    let current = payload.decimal("value");
    let previous = payload.decimal("value_old");
    let change = match (current, previous) {
        (Some(current), Some(previous)) => current
            .checked_sub(previous)
            .map_or_else(|| PLACEHOLDER.to_owned(), |delta| unit.format_signed(delta)),
        _ => PLACEHOLDER.to_owned(),
    };

    RenderedNotification::new(format!("{} Change", humanize(&attribute)))
        .field_opt("Object", payload.text("object_id"))
        .field("Previous", unit.format_opt(previous))
        .field("Current", unit.format_opt(current))
        .field("Change", change)
}
