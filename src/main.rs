//! Rentify server
//!
//! Opens the Sled-backed entity store, seeds the demo portfolio on first
//! start and serves the REST API.
//!
//! Usage:
//!   cargo run --bin load_data    # populate data (optional, the server seeds too)
//!   cargo run --bin rentify      # start server
//!   curl -X POST localhost:11111/login -d '{"email":"landlord@test.com","password":"password123"}' \
//!        -H 'content-type: application/json'

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rentify::config::AppConfig;
use rentify::rent::SystemClock;
use rentify::rest::create_router;
use rentify::storage::Storage;
use rentify::store::EntityStore;
use rentify::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init(&config);
    if config.uses_dev_secret() {
        warn!("RENTIFY_JWT_SECRET not set, signing tokens with the development secret");
    }

    let storage = Storage::open(&config.data_dir)?;
    let mut store = EntityStore::open(storage, Arc::new(SystemClock))?;
    if config.seed_demo {
        store.seed_demo_data(config.bcrypt_cost)?;
    }

    let addr = config.addr;
    let app = create_router(store, config.clone());

    info!(%addr, data_dir = %config.data_dir, "Rentify REST API listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for ctrl-c");
    }
}
