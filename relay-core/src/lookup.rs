//! Display-name enrichment for formatters.
//!
//! Formatters receive a `NameResolver` rather than a database handle. Every
//! lookup is best-effort: [`display_player`] and friends fall back to the raw
//! id when the lookup fails or finds nothing.

use crate::entities::display_name::{GetAddressOwner, GetGuildName, GetPlayerUsername};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn player_name(&self, player_id: &str) -> Result<Option<String>, LookupError>;

    async fn guild_name(&self, guild_id: &str) -> Result<Option<String>, LookupError>;

    /// Player id owning a ledger address.
    async fn address_owner(&self, address: &str) -> Result<Option<String>, LookupError>;
}

#[async_trait]
impl NameResolver for DatabaseProcessor {
    async fn player_name(&self, player_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self
            .process(GetPlayerUsername {
                player_id: player_id.to_owned(),
            })
            .await?)
    }

    async fn guild_name(&self, guild_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self
            .process(GetGuildName {
                guild_id: guild_id.to_owned(),
            })
            .await?)
    }

    async fn address_owner(&self, address: &str) -> Result<Option<String>, LookupError> {
        Ok(self
            .process(GetAddressOwner {
                address: address.to_owned(),
            })
            .await?)
    }
}

fn with_fallback(id: &str, resolved: Result<Option<String>, LookupError>, kind: &str) -> String {
    match resolved {
        Ok(Some(name)) => format!("{name} ({id})"),
        Ok(None) => id.to_owned(),
        Err(e) => {
            debug!(id, kind, error = %e, "Name lookup failed, showing raw id");
            id.to_owned()
        }
    }
}

/// `"name (id)"` for a player, or the raw id.
pub async fn display_player(resolver: &dyn NameResolver, player_id: &str) -> String {
    with_fallback(player_id, resolver.player_name(player_id).await, "player")
}

/// `"name (id)"` for a guild, or the raw id.
pub async fn display_guild(resolver: &dyn NameResolver, guild_id: &str) -> String {
    with_fallback(guild_id, resolver.guild_name(guild_id).await, "guild")
}

/// Owning player of an address rendered as `"name (id)"`, or the raw address.
pub async fn display_address(resolver: &dyn NameResolver, address: &str) -> String {
    match resolver.address_owner(address).await {
        Ok(Some(player_id)) => display_player(resolver, &player_id).await,
        other => with_fallback(address, other, "address"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticResolver;

    #[tokio::test]
    async fn test_resolved_names_keep_the_id() {
        let resolver = StaticResolver::default()
            .player("1-7", "Vela")
            .guild("0-3", "Outer Rim");
        assert_eq!(display_player(&resolver, "1-7").await, "Vela (1-7)");
        assert_eq!(display_guild(&resolver, "0-3").await, "Outer Rim (0-3)");
    }

    #[tokio::test]
    async fn test_unknown_ids_fall_back_to_raw() {
        let resolver = StaticResolver::default();
        assert_eq!(display_player(&resolver, "1-9").await, "1-9");
        assert_eq!(display_address(&resolver, "structs1abc").await, "structs1abc");
    }

    #[tokio::test]
    async fn test_failing_lookups_fall_back_to_raw() {
        let resolver = StaticResolver::failing();
        assert_eq!(display_player(&resolver, "1-7").await, "1-7");
        assert_eq!(display_address(&resolver, "structs1abc").await, "structs1abc");
    }

    #[tokio::test]
    async fn test_address_resolves_through_owner() {
        let resolver = StaticResolver::default()
            .player("1-7", "Vela")
            .address("structs1abc", "1-7");
        assert_eq!(display_address(&resolver, "structs1abc").await, "Vela (1-7)");
    }
}
