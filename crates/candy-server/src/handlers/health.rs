// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{ProcessesToUpdate, System};
use tracing::warn;

use crate::state::SharedState;

/// Memory figures in bytes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident memory of this process.
    pub rss: u64,
    /// Memory in use system-wide.
    pub system_used: u64,
    /// Total system memory.
    pub system_total: u64,
}

impl MemoryUsage {
    /// Sample current memory usage.
    pub fn sample() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let rss = match sysinfo::get_current_pid() {
            Ok(pid) => {
                sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                sys.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            Err(e) => {
                warn!(error = e, "Unable to resolve current pid");
                0
            }
        };
        Self {
            rss,
            system_used: sys.used_memory(),
            system_total: sys.total_memory(),
        }
    }
}

/// Answer of `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
    /// Memory usage.
    pub memory: MemoryUsage,
    /// Deployment environment.
    pub environment: String,
    /// Server version.
    pub version: &'static str,
    /// `connected` or `disconnected`.
    pub database: &'static str,
}

/// `GET /health`
///
/// Answers 503 when the database does not respond.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.persistence.health_check_db().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let memory = tokio::task::spawn_blocking(MemoryUsage::sample)
        .await
        .unwrap_or_default();

    let (status, label, database) = if database_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            timestamp: Utc::now(),
            uptime: state.started_at.elapsed().as_secs_f64(),
            memory,
            environment: state.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
