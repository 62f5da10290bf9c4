// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Router assembly and the serve loop.

use std::future::Future;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{achievements, auth, game, health, messages};
use crate::state::SharedState;

/// Build the application router.
///
/// API routes are nested under `/{api_prefix}`; `/health` is always at the
/// root.
pub fn build_router(state: SharedState, api_prefix: &str) -> Router {
    let api = Router::new()
        .route("/game/state", get(game::get_state).put(game::put_state))
        .route("/game/sync", post(game::sync))
        .route("/game/achievements", get(achievements::list))
        .route("/game/achievements/{id}", post(achievements::unlock))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/validate", get(auth::validate))
        .route("/messages", get(messages::list).post(messages::create));

    let prefix = api_prefix.trim_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };

    router
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
