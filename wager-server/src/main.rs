//! Wager Server
//!
//! Runs either the line provider (event truth and outcome announcements) or
//! the bet maker (bet placement and settlement).

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::{Parser, Subcommand};
use config::{ConfigLoader, LoadedConfig, Overrides, Role};
use server::{build_bet_router, build_line_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::{BetState, LineState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wager_core::broker::{AmqpOutcomePublisher, SettlementConsumer};
use wager_core::entities::bet::{BetStore, InMemoryBetStore, PgBetStore};
use wager_core::entities::event::EventStore;
use wager_core::services::{BetService, LineService};
use wager_sdk::client::LineClient;

/// Wager - event outcomes and bet settlement
#[derive(Parser, Debug)]
#[command(name = "wager-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (optional; defaults apply if missing)
    #[arg(short, long, default_value = "./wager-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// AMQP URL of the message broker
    #[arg(long, env = "RABBITMQ_URL", hide_env_values = true)]
    rabbitmq_url: Option<String>,

    /// PostgreSQL URL for bets; bets are kept in memory when unset
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Root URL of the line provider, used by the bet maker
    #[arg(long, env = "LINE_PROVIDER_URL")]
    line_provider_url: Option<String>,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand, Debug)]
enum Service {
    /// Serve the events API and publish outcome notifications
    LineProvider,
    /// Serve the bets API and settle bets from outcome notifications
    BetMaker {
        /// Run database migrations on startup
        #[arg(long, default_value = "false")]
        migrate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting wager-server v{}", env!("CARGO_PKG_VERSION"));

    let role = match args.service {
        Service::LineProvider => Role::LineProvider,
        Service::BetMaker { .. } => Role::BetMaker,
    };
    let overrides = Overrides {
        listen: args.listen,
        broker_url: args.rabbitmq_url.clone(),
        database_url: args.database_url.clone(),
        line_provider_url: args.line_provider_url.clone(),
    };

    // Load configuration
    let config = ConfigLoader::new(&args.config, role, overrides)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!(?role, "Configuration loaded");

    match args.service {
        Service::LineProvider => run_line_provider(config).await,
        Service::BetMaker { migrate } => run_bet_maker(config, migrate).await,
    }
}

async fn run_line_provider(config: LoadedConfig) -> anyhow::Result<()> {
    let publisher = AmqpOutcomePublisher::new(
        config.broker.url,
        config.broker.queue,
        config.broker.publish_timeout,
    );
    let state = LineState {
        events: LineService::new(EventStore::new(), Arc::new(publisher)),
    };

    let (shutdown_tx, _shutdown_rx) = watch::channel(false);
    let listen_addr = config.line_provider.listen;
    tracing::info!("Starting line provider on {}", listen_addr);
    run_server(build_line_router(state), listen_addr, shutdown_tx).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn run_bet_maker(config: LoadedConfig, migrate: bool) -> anyhow::Result<()> {
    let bet_maker = config.bet_maker;

    // Select the bet store
    let (store, db_pool) = match &bet_maker.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    e
                })?;
            tracing::info!("Database connection established");

            if migrate {
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
            (
                Arc::new(PgBetStore::new(db_pool.clone())) as Arc<dyn BetStore>,
                Some(db_pool),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, bets are kept in memory");
            (Arc::new(InMemoryBetStore::new()) as Arc<dyn BetStore>, None)
        }
    };

    let source = LineClient::new(bet_maker.line_provider_url.clone(), bet_maker.snapshot_timeout);
    let bets = BetService::new(store, Arc::new(source), bet_maker.snapshot_timeout);

    // Spawn the settlement consumer
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = SettlementConsumer::new(
        config.broker.url,
        config.broker.queue,
        config.broker.prefetch,
        bets.clone(),
        shutdown_rx,
    );
    let consumer_handle = tokio::spawn(consumer.run());

    // Run the server
    tracing::info!("Starting bet maker on {}", bet_maker.listen);
    let result = run_server(
        build_bet_router(BetState { bets }),
        bet_maker.listen,
        shutdown_tx.clone(),
    )
    .await;

    // Stop the consumer even when the server failed to start
    let _ = shutdown_tx.send(true);
    if let Err(e) = consumer_handle.await {
        tracing::error!(error = %e, "Settlement consumer task failed");
    }

    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,lapin=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
