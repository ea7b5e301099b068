//! Payroll engine HTTP server.
//!
//! Reads its configuration from the YAML file named by `PAYROLL_CONFIG`,
//! falling back to built-in defaults, and serves the payroll API over an
//! in-memory store.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::service::PayrollService;
use payroll_engine::store::MemoryStore;

const CONFIG_ENV: &str = "PAYROLL_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loader = match std::env::var(CONFIG_ENV) {
        Ok(path) => ConfigLoader::load(path)?,
        Err(_) => ConfigLoader::default(),
    };
    let config = loader.config();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let store = MemoryStore::new();
    let (service, worker) =
        PayrollService::new(Arc::new(store.clone()), Arc::new(store), config);
    worker.spawn();

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    info!(
        bind_address = %config.server.bind_address,
        hours_per_day = %config.calculation.hours_per_day,
        "Payroll engine listening"
    );

    axum::serve(listener, create_router(AppState::new(service))).await?;
    Ok(())
}
