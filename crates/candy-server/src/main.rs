// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cosmic Candy Factory - API Server

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use candy_server::config::Config;
use candy_server::persistence::{Persistence, PostgresPersistence, SqlitePersistence};
use candy_server::server::{build_router, serve};
use candy_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("candy_server=info".parse()?),
        )
        .init();

    info!("Starting Cosmic Candy Factory server");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        port = config.port,
        api_prefix = %config.api_prefix,
        environment = %config.environment,
        sqlite = config.uses_sqlite(),
        "Configuration loaded"
    );

    info!("Connecting to database and running migrations...");
    let persistence: Arc<dyn Persistence> = if config.uses_sqlite() {
        Arc::new(SqlitePersistence::connect(&config.database_url, config.db_max_connections).await?)
    } else {
        Arc::new(
            PostgresPersistence::connect(&config.database_url, config.db_max_connections).await?,
        )
    };
    if !persistence.health_check_db().await? {
        anyhow::bail!("database health check failed");
    }
    info!("Database ready");

    let state = Arc::new(AppState::new(persistence, &config));
    let router = build_router(state, &config.api_prefix);
    let listener = TcpListener::bind(config.listen_addr()).await?;

    serve(listener, router, shutdown_signal()).await?;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
