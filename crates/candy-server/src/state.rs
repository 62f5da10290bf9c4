// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared handler state.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtAuthenticator;
use crate::config::Config;
use crate::persistence::Persistence;
use crate::proxy::AuthProxy;

/// State shared by every handler.
pub struct AppState {
    /// Storage backend.
    pub persistence: Arc<dyn Persistence>,
    /// Token verifier for game routes.
    pub auth: JwtAuthenticator,
    /// Proxy to the authentication service.
    pub proxy: AuthProxy,
    /// Deployment environment name.
    pub environment: String,
    /// Process start, for `/health` uptime.
    pub started_at: Instant,
}

/// Handle passed to axum.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build the state from loaded configuration.
    pub fn new(persistence: Arc<dyn Persistence>, config: &Config) -> Self {
        Self {
            persistence,
            auth: JwtAuthenticator::new(&config.jwt_secret),
            proxy: AuthProxy::new(config.auth_url.clone(), config.cookie_domain.clone()),
            environment: config.environment.clone(),
            started_at: Instant::now(),
        }
    }
}
