//! PodRank Engine
//!
//! A podcast catalog discovery and ranking service.
//!
//! # Architecture
//!
//! - **Discovery Engine**: trending, related, recommended, and search
//!   queries over the podcast catalog
//! - **Store Backends**: PostgreSQL collaborators for catalog items and
//!   user signals
//! - **API Server**: REST endpoints for frontend consumption
//!
//! # Graceful Shutdown
//!
//! The server handles SIGTERM and SIGINT, letting in-flight requests
//! complete before the process exits.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use podrank::api;
use podrank::config::Config;
use podrank::discovery::DiscoveryEngine;
use podrank::error::Result;
use podrank::store::{self, PostgresCatalog, PostgresProfiles};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("PodRank Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded and validated");

    // Initialize database connection pool
    let pool = store::postgres::create_pool(&config.database).await?;
    info!("Database connection pool established");

    // Run migrations
    store::postgres::run_migrations(&pool).await?;

    // Wire the engine to its collaborators
    let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
    let profiles = Arc::new(PostgresProfiles::new(pool));
    let engine = DiscoveryEngine::new(catalog, profiles, config.discovery.clone());
    info!("Discovery engine initialized");

    // Serve until shutdown
    api::start_server(engine, &config.api).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize structured logging. `RUST_LOG` controls the filter;
/// `LOG_FORMAT=json` switches to JSON output for log shippers.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,podrank=debug,sqlx=warn"));

    let json_output = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}
