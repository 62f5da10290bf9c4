// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cosmic Candy Factory - HTTP API Server
//!
//! Stores one game document per user, arbitrates sync conflicts, records
//! achievement unlocks and proxies authentication to an external service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Bearer / cookie  ┌───────────────────────────────┐
//! │ candy-client │──────────────────►│ axum Router                   │
//! └──────────────┘                   │  /{API_PREFIX}/game/*  ──► AuthUser (HS256)
//!                                    │  /{API_PREFIX}/auth/*  ──► AuthProxy ──► AUTH_URL
//!                                    │  /{API_PREFIX}/messages                │
//!                                    │  /health                               │
//!                                    └──────────────┬────────────────────────┘
//!                                                   ▼
//!                                   Persistence (PostgreSQL | SQLite)
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | GET | `/game/state` | yes | Stored document, 404 when none |
//! | PUT | `/game/state` | yes | Upsert the document |
//! | POST | `/game/sync` | yes | Upsert unless the stored copy wins |
//! | GET | `/game/achievements` | yes | Catalog joined with the user's unlocks |
//! | POST | `/game/achievements/{id}` | yes | Idempotent unlock |
//! | POST | `/auth/login`, `/auth/logout`, `/auth/register` | no | Proxied |
//! | GET | `/auth/validate` | no | Proxied |
//! | GET, POST | `/messages` | no | Message board |
//! | GET | `/health` | no | Uptime, memory, database status |
//!
//! Errors are JSON: `{"statusCode": 404, "message": "...", "error": "Not Found"}`.
//!
//! # Modules
//!
//! - [`config`]: Environment configuration
//! - [`persistence`]: Storage trait and backends
//! - [`auth`]: Token verification and the [`auth::AuthUser`] extractor
//! - [`proxy`]: Authentication service proxy
//! - [`server`]: Router and serve loop

#![deny(missing_docs)]

/// Bearer token authentication.
pub mod auth;

/// Configuration loading from environment variables.
pub mod config;

/// Error types and their HTTP mapping.
pub mod error;

/// HTTP handlers.
pub mod handlers;

/// Embedded SQL migrations.
pub mod migrations;

/// Storage trait and backends.
pub mod persistence;

/// Authentication service proxy.
pub mod proxy;

/// Router assembly and serve loop.
pub mod server;

/// Shared handler state.
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{Result, ServerError};
pub use persistence::{Persistence, PostgresPersistence, SqlitePersistence};
pub use server::{build_router, serve};
pub use state::{AppState, SharedState};
