use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use wedding_rsvp_api::app::{router, AppState};
use wedding_rsvp_api::config::Config;
use wedding_rsvp_api::jobs::{JobScheduler, PoolMetricsJob, RateLimitPruneJob, SessionCleanupJob};
use wedding_rsvp_api::middleware::{init_metrics, logging::init_logging};
use wedding_rsvp_api::services::{bootstrap_admin, EmailNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to initialize metrics")?;

    info!("Starting wedding RSVP API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    bootstrap_admin(&pool, &config.admin).await?;

    let addr = config.socket_addr()?;
    let notifier = Arc::new(EmailNotifier::new(config.notification.clone()));
    let state = AppState::new(config, pool.clone(), notifier);

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.register(SessionCleanupJob::new(pool));
    scheduler.register(RateLimitPruneJob::new(state.limiters()));
    scheduler.start();

    let app = router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
