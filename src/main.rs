use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::{Notify, watch};
use tracing_subscriber::EnvFilter;

use castmint::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config; a missing required value is fatal before anything starts.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting castmint");

    // The queue store connection is fatal at startup, transient afterwards.
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to queue store: {e}");
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations applied");

    let store: Arc<dyn castmint::store::QueueStore> =
        Arc::new(castmint::store::PgQueueStore::new(pool.clone()));
    let history: Arc<dyn castmint::history::HistoryStore> =
        Arc::new(castmint::history::PgHistoryStore::new(pool.clone()));
    let dedup = castmint::dedup::DedupGate::new(store.clone());
    let health = Arc::new(castmint::health::HealthMonitor::new());
    let wake = Arc::new(Notify::new());

    let social = Arc::new(castmint::clients::farcaster::FarcasterApi::new(
        &config.farcaster_api_url,
        &config.farcaster_api_key,
    ));
    let renderer = Arc::new(castmint::clients::renderer::HttpRenderer::new(
        &config.renderer_url,
    ));
    let storage = Arc::new(castmint::clients::storage::PinningClient::new(
        &config.storage_url,
        &config.storage_token,
    ));
    let relay = Arc::new(castmint::clients::chain::RelayClient::new(
        &config.relay_url,
        &config.relay_api_key,
    ));

    let pipeline = castmint::pipeline::MintPipeline::new(
        social,
        renderer,
        storage,
        relay.clone(),
        relay,
        history.clone(),
        dedup.clone(),
        config.contract_address.clone(),
        config.platform_address.clone(),
        config.signer_id.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = castmint::worker::Worker::new(
        store.clone(),
        pipeline,
        health.clone(),
        wake.clone(),
        Duration::from_millis(config.poll_interval_ms),
    );
    let worker_handle = worker.spawn(shutdown_rx);

    let addr = SocketAddr::new(config.host, config.port);
    let state: castmint::state::SharedState = Arc::new(castmint::state::AppState {
        config,
        store,
        history,
        dedup,
        health,
        wake,
    });
    let app = castmint::build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain: stop issuing dequeues, let any in-flight item finish, then
    // release the store connection.
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
