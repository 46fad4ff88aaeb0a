//! # nearbyaid-server
//!
//! HTTP backend for NearByAid, a map of free help points (food, medical,
//! shelter) shared by registered volunteers.
//!
//! This binary provides:
//! - **Accounts**: registration and login, issuing bearer tokens
//! - **Help points**: authenticated creation, anonymous radius search
//! - **SQLite storage** with an R*Tree index over point locations

mod aid;
mod api;
mod auth;
mod config;
mod error;

use anyhow::Context;
use nearbyaid_store::Database;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nearbyaid_server=debug,nearbyaid_store=debug")),
        )
        .init();

    info!("Starting NearByAid server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set, tokens are signed with the development secret");
    }

    let db = Database::open_at(&config.database_path).with_context(|| {
        format!("opening database at {}", config.database_path.display())
    })?;
    info!(path = %config.database_path.display(), "Database ready");

    let http_addr = config.http_addr;
    let state = AppState::new(db, config);

    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
