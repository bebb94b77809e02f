//! Configuration module for relay-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin secret hashing.

pub mod file;

use crate::config::file::FileConfig;
use relay_core::config::{
    AdminConfig, BrokerConfig, DiscordConfig, MAX_IN_FLIGHT, RelayConfig, RouterConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,

    #[error("DISCORD_TOKEN is not set")]
    MissingDiscordToken,
}

/// Values given on the command line or through their environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub broker_address: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub max_reconnect_attempts: Option<usize>,
    pub discord_token: Option<String>,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub relay: RelayConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 3. Apply CLI overrides
    /// 4. Validate the configuration
    /// 5. Build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        // Hash before applying overrides so they never end up in the file.
        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = AdminConfig::from_plaintext(&file_config.admin.secret)
                .map_err(|e| ConfigError::HashError(e.to_string()))?
                .secret_hash;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        self.apply_overrides(&mut file_config);
        self.build_loaded_config(file_config, secret_hash)
    }

    /// Reload only the admin section (used during SIGHUP).
    pub fn reload_admin(&self) -> Result<AdminConfig, ConfigError> {
        Ok(self.load()?.relay.admin)
    }

    fn apply_overrides(&self, config: &mut FileConfig) {
        let overrides = &self.overrides;
        if let Some(listen) = overrides.listen {
            config.server.listen = listen;
        }
        if let Some(address) = &overrides.broker_address {
            config.broker.address = address.clone();
        }
        if let Some(secs) = overrides.connect_timeout_secs {
            config.broker.connect_timeout_secs = secs;
        }
        if let Some(attempts) = overrides.max_reconnect_attempts {
            config.broker.max_reconnect_attempts = Some(attempts);
        }
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }

    fn build_loaded_config(
        &self,
        file_config: FileConfig,
        secret_hash: String,
    ) -> Result<LoadedConfig, ConfigError> {
        validate(&file_config)?;

        let token = self
            .overrides
            .discord_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingDiscordToken)?;
        let api_base = parse_api_base(&file_config.discord.api_base)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            relay: RelayConfig {
                admin: AdminConfig::new(secret_hash),
                broker: BrokerConfig {
                    address: file_config.broker.address,
                    connect_timeout: Duration::from_secs(file_config.broker.connect_timeout_secs),
                    max_reconnect_attempts: file_config.broker.max_reconnect_attempts,
                    health_subject: file_config.broker.health_subject,
                },
                router: RouterConfig {
                    namespace: file_config.relay.namespace,
                    system_address: file_config.relay.system_address,
                    max_in_flight: file_config.relay.max_in_flight,
                },
                discord: DiscordConfig {
                    api_base,
                    token,
                    request_timeout: Duration::from_secs(file_config.discord.request_timeout_secs),
                },
            },
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.broker.address.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "broker.address must not be empty".to_owned(),
        ));
    }
    if config.broker.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "broker.connect_timeout_secs must be at least 1".to_owned(),
        ));
    }
    let namespace = &config.relay.namespace;
    if namespace.is_empty() || namespace.contains(['.', '*', '>']) || namespace.contains(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "relay.namespace {namespace:?} must be a single topic segment"
        )));
    }
    if !(1..=MAX_IN_FLIGHT).contains(&config.relay.max_in_flight) {
        return Err(ConfigError::ValidationError(format!(
            "relay.max_in_flight must be between 1 and {MAX_IN_FLIGHT}"
        )));
    }
    Ok(())
}

/// The API base must end with `/` so relative joins keep its path.
fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::ValidationError(format!("discord.api_base {raw:?}: {e}")))
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[admin]
secret = "hunter2"

[broker]
address = "nats://127.0.0.1:4222"

[discord]
api_base = "https://discord.com/api/v10"
"#;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("relay-config-test-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("relay-config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn overrides() -> Overrides {
        Overrides {
            discord_token: Some("token".to_owned()),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_plaintext_secret_is_hashed_and_rewritten() {
        let path = write_config("hash", CONFIG);
        let loaded = ConfigLoader::new(&path, overrides()).load().unwrap();

        assert!(loaded.relay.admin.verify_secret("hunter2"));
        let rewritten: FileConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(rewritten.is_admin_secret_hashed());

        // A second load keeps the stored hash.
        let again = ConfigLoader::new(&path, overrides()).load().unwrap();
        assert_eq!(again.relay.admin.secret_hash, rewritten.admin.secret);
    }

    #[test]
    fn test_overrides_win_but_are_not_persisted() {
        let path = write_config("overrides", CONFIG);
        let loader = ConfigLoader::new(
            &path,
            Overrides {
                listen: Some("127.0.0.1:9999".parse().unwrap()),
                broker_address: Some("nats://other:4222".to_owned()),
                connect_timeout_secs: Some(2),
                max_reconnect_attempts: Some(3),
                ..overrides()
            },
        );
        let loaded = loader.load().unwrap();

        assert_eq!(loaded.listen.port(), 9999);
        assert_eq!(loaded.relay.broker.address, "nats://other:4222");
        assert_eq!(loaded.relay.broker.connect_timeout, Duration::from_secs(2));
        assert_eq!(loaded.relay.broker.max_reconnect_attempts, Some(3));

        let on_disk: FileConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.broker.address, "nats://127.0.0.1:4222");
    }

    #[test]
    fn test_api_base_gets_trailing_slash() {
        let path = write_config("api-base", CONFIG);
        let loaded = ConfigLoader::new(&path, overrides()).load().unwrap();
        assert_eq!(
            loaded.relay.discord.api_base.as_str(),
            "https://discord.com/api/v10/"
        );
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let path = write_config("token", CONFIG);
        let result = ConfigLoader::new(&path, Overrides::default()).load();
        assert!(matches!(result, Err(ConfigError::MissingDiscordToken)));
    }

    #[test]
    fn test_invalid_namespace_is_rejected() {
        let path = write_config(
            "namespace",
            &format!("{CONFIG}\n[relay]\nnamespace = \"a.b\"\n"),
        );
        let result = ConfigLoader::new(&path, overrides()).load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_max_in_flight_bounds() {
        for value in [0, MAX_IN_FLIGHT + 1] {
            let path = write_config(
                &format!("in-flight-{value}"),
                &format!("{CONFIG}\n[relay]\nmax_in_flight = {value}\n"),
            );
            let result = ConfigLoader::new(&path, overrides()).load();
            assert!(matches!(result, Err(ConfigError::ValidationError(_))), "{value}");
        }
    }
}
