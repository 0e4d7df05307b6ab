//! Federation Portal Server
//!
//! Membership fees and competition registrations paid through LiqPay.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use fedportal_core::events::{EventSenders, notification_channel};
use fedportal_core::framework::DatabaseProcessor;
use fedportal_core::gateway::LiqPayGateway;
use fedportal_core::processors::{ExpiryWatcher, NotificationSender};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Federation portal payment backend
#[derive(Parser, Debug)]
#[command(name = "fedportal-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "FEDPORTAL_CONFIG", default_value = "./fedportal-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long, env = "FEDPORTAL_LISTEN")]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "FEDPORTAL_LOG_JSON", default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.log_json);

    tracing::info!("Starting fedportal-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let shared_config = loaded_config.into_shared();

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

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

    let db = DatabaseProcessor::new(db_pool.clone());

    // Background processors
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (notification_tx, notification_rx) = notification_channel();
    let event_senders = EventSenders::new(notification_tx);

    let expiry_watcher = ExpiryWatcher::new(
        db.clone(),
        shared_config.payments.clone(),
        event_senders.clone(),
        shutdown_rx.clone(),
    );
    let notification_sender = NotificationSender::new(
        db.clone(),
        shared_config.email.clone(),
        notification_rx,
        shutdown_rx,
    );
    let processor_handles = [
        tokio::spawn(expiry_watcher.run()),
        tokio::spawn(notification_sender.run()),
    ];

    let gateway = Arc::new(LiqPayGateway::new(shared_config.liqpay.clone()));
    let state = AppState::new(db, shared_config, gateway, event_senders);

    // Spawn config reload handler (listens for SIGHUP)
    let reload_shutdown = spawn_config_reload_handler(state.clone(), config_loader);

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background work before closing the pool
    reload_shutdown.notify_one();
    let _ = shutdown_tx.send(true);
    for handle in processor_handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Background processor panicked");
        }
    }

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
