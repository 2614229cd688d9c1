//! StablePay ledger service.
//!
//! Records confirmed token-to-custody withdrawals and tracks their INR
//! settlement.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// StablePay ledger - withdrawal records and INR settlement
#[derive(Parser, Debug)]
#[command(name = "stablepay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./stablepay-ledger.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting stablepay-server");

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let runtime_config = config_loader.load().inspect_err(|e| {
        tracing::error!(path = ?args.config, error = %e, "Failed to load configuration")
    })?;
    let listen_addr = runtime_config.server.listen;
    tracing::info!(
        path = ?args.config,
        chains = ?runtime_config.chains,
        "Configuration loaded"
    );

    let db_pool = connect_database(args.migrate).await?;
    let state = AppState::new(db_pool.clone(), runtime_config);

    // Reloads on SIGHUP until notified.
    let reload_stop = spawn_config_reload_handler(state.clone(), config_loader);

    let result = run_server(build_router(state), listen_addr).await;

    reload_stop.notify_one();
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Connect to `DATABASE_URL`, optionally applying pending migrations.
async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    let database_url = get_database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to database"))?;
    tracing::info!("Database connection established");

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to run migrations"))?;
        tracing::info!("Migrations completed successfully");
    }
    Ok(pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
