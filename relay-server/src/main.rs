//! Event Subscription Relay Server
//!
//! Relays broker events to chat channels according to stored topic
//! subscriptions.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, Overrides, get_database_url};
use relay_core::broker::Broker;
use relay_core::connection::ConnectionManager;
use relay_core::events::delivery_channel;
use relay_core::framework::DatabaseProcessor;
use relay_core::lookup::NameResolver;
use relay_core::registry::SubscriptionRegistry;
use relay_core::router::MessageRouter;
use relay_core::sink::{DiscordSink, NotificationSink};
use relay_core::store::SubscriptionStore;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Event subscription relay - broker events to chat channels
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./relay-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the broker address (e.g., nats://127.0.0.1:4222)
    #[arg(long, env = "RELAY_BROKER_ADDRESS")]
    broker_address: Option<String>,

    /// Override the broker connect timeout in seconds
    #[arg(long, env = "RELAY_BROKER_CONNECT_TIMEOUT_SECS")]
    connect_timeout_secs: Option<u64>,

    /// Override the maximum broker reconnect attempts
    #[arg(long, env = "RELAY_BROKER_MAX_RECONNECTS")]
    max_reconnect_attempts: Option<usize>,

    /// Bot token for the chat API
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen,
            broker_address: self.broker_address.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            max_reconnect_attempts: self.max_reconnect_attempts,
            discord_token: self.discord_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.json_logs);

    tracing::info!("Starting relay-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.overrides()));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let listen_addr = loaded_config.listen;
    let relay_config = loaded_config.relay;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Connect to the broker; unreachable is fatal
    let connection = Arc::new(
        ConnectionManager::connect(&relay_config.broker)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to broker: {}", e);
                e
            })?,
    );

    let processor = DatabaseProcessor::new(db_pool.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (delivery_tx, delivery_rx) = delivery_channel();

    // Start the message router
    let message_router = Arc::new(MessageRouter::new(
        relay_config.router.clone(),
        Arc::new(processor.clone()) as Arc<dyn NameResolver>,
        Arc::new(DiscordSink::new(&relay_config.discord)) as Arc<dyn NotificationSink>,
    ));
    let router_handle = tokio::spawn(message_router.run(delivery_rx, shutdown_rx));

    // Replay stored subscriptions; an unreadable store is fatal
    let registry = Arc::new(SubscriptionRegistry::new(
        Arc::clone(&connection) as Arc<dyn Broker>,
        Arc::new(processor) as Arc<dyn SubscriptionStore>,
        delivery_tx,
    ));
    registry.load_all().await.map_err(|e| {
        tracing::error!("Failed to load stored subscriptions: {}", e);
        e
    })?;

    // Create application state
    let state = AppState::new(
        Arc::clone(&registry),
        relay_config.admin,
        &relay_config.router.namespace,
    );

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let app = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(app, listen_addr).await;

    // Stop accepting broker messages, then drain the router
    reload_notify.notify_one();
    registry.shutdown().await;
    let _ = shutdown_tx.send(true);
    if let Err(e) = router_handle.await {
        tracing::error!("Message router task failed: {}", e);
    }
    connection.shutdown().await;

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
