//! Read-only lookups against the domain database.
//!
//! Each returns `None` when the id is unknown; notifications then fall back
//! to showing the raw id.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

#[derive(Debug, Clone)]
pub struct GetPlayerUsername {
    pub player_id: String,
}

impl Processor<GetPlayerUsername> for DatabaseProcessor {
    type Output = Option<String>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPlayerUsername")]
    async fn process(&self, query: GetPlayerUsername) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT username
            FROM player_meta
            WHERE id = $1 AND username IS NOT NULL AND username <> ''
            "#,
        )
        .bind(query.player_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetGuildName {
    pub guild_id: String,
}

impl Processor<GetGuildName> for DatabaseProcessor {
    type Output = Option<String>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetGuildName")]
    async fn process(&self, query: GetGuildName) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM guild_meta
            WHERE id = $1 AND name IS NOT NULL AND name <> ''
            "#,
        )
        .bind(query.guild_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Player id that owns a ledger address.
pub struct GetAddressOwner {
    pub address: String,
}

impl Processor<GetAddressOwner> for DatabaseProcessor {
    type Output = Option<String>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAddressOwner")]
    async fn process(&self, query: GetAddressOwner) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT player_id
            FROM player_address
            WHERE address = $1
            LIMIT 1
            "#,
        )
        .bind(query.address)
        .fetch_optional(&self.pool)
        .await
    }
}
