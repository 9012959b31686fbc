// Marketplace worker: payment notifications and the listing expiry sweep

use anyhow::{Context, Result};
use marketplace_core::kernel::{
    run_payment_listener, start_scheduler, MarketplaceDeps, NatsClientPublisher, PgListingStore,
    SystemClock,
};
use marketplace_core::Config;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting marketplace worker");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Connect to NATS
    let nats = async_nats::connect(&config.nats_url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats_url))?;
    tracing::info!(url = %config.nats_url, "NATS connected");

    let deps = MarketplaceDeps::new(
        Arc::new(PgListingStore::new(pool)),
        Arc::new(NatsClientPublisher::new(nats.clone())),
        Arc::new(SystemClock),
        config.marketplace,
    );

    let mut scheduler = start_scheduler(&config.expiry_sweep_cron, deps.clone()).await?;
    let listener = tokio::spawn(run_payment_listener(nats, deps));

    tokio::select! {
        result = listener => {
            result.context("Payment listener panicked")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown requested");
        }
    }

    scheduler
        .shutdown()
        .await
        .context("Failed to stop scheduler")?;
    tracing::info!("Marketplace worker stopped");

    Ok(())
}
