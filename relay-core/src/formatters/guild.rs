//! Guild events: configuration, membership and the guild bank.

use super::humanize;
use super::units::Unit;
use crate::events::InboundEvent;
use crate::lookup::{NameResolver, display_guild, display_player};
use relay_sdk::objects::RenderedNotification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildCategory {
    Consensus,
    Membership,
    BankMint,
    BankRedeem,
    Other(String),
}

impl GuildCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "guild_consensus" => Self::Consensus,
            "guild_membership" => Self::Membership,
            "guild_bank_mint" => Self::BankMint,
            "guild_bank_redeem" => Self::BankRedeem,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Guild tokens are minted at the same precision as alpha.
fn guild_token() -> Unit {
    Unit::new("token", -6)
}

pub async fn render(
    category: &GuildCategory,
    event: &InboundEvent,
    resolver: &dyn NameResolver,
) -> RenderedNotification {
    let payload = &event.payload;
    let guild = match payload.text("guild_id") {
        Some(id) => Some(display_guild(resolver, &id).await),
        None => None,
    };
    let player = match payload.text("player_id") {
        Some(id) => Some(display_player(resolver, &id).await),
        None => None,
    };

    match category {
        GuildCategory::Consensus => {
            let owner = match payload.text("owner") {
                Some(id) => Some(display_player(resolver, &id).await),
                None => None,
            };
            RenderedNotification::new("Guild Updated")
                .field_opt("Guild", guild)
                .field_opt("Owner", owner)
                .field_opt("Endpoint", payload.text("endpoint"))
        }
        GuildCategory::Membership => {
            let status = payload.text("status").map(|s| humanize(&s));
            let title = match &status {
                Some(status) => format!("Guild Membership {status}"),
                None => "Guild Membership Update".to_owned(),
            };
            RenderedNotification::new(title)
                .field_opt("Guild", guild)
                .field_opt("Player", player)
                .field_opt("Status", status)
        }
        GuildCategory::BankMint | GuildCategory::BankRedeem => {
            let title = if *category == GuildCategory::BankMint {
                "Guild Tokens Minted"
            } else {
                "Guild Tokens Redeemed"
            };
            RenderedNotification::new(title)
                .field_opt("Guild", guild)
                .field_opt("Player", player)
                .field("Alpha", Unit::micro_alpha().format_opt(payload.decimal("amount_alpha")))
                .field("Tokens", guild_token().format_opt(payload.decimal("amount_token")))
        }
        GuildCategory::Other(other) => RenderedNotification::new(format!("Guild {}", humanize(other)))
            .field_opt("Guild", guild)
            .field_opt("Player", player),
    }
}
