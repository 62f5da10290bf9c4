// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cosmic Candy Factory - Client
//!
//! Drives a game model on timers and keeps it saved, locally and on the
//! candy server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ GameRuntime<S: Simulation>                   │
//! │  active tick ─┐                              │
//! │  inactive tick├─► Mutex<S> ──► watch::Sender │──► UI subscribers
//! │  autosave ────┤                              │
//! │  sync ────────┘                              │
//! └───────────────┬──────────────────────────────┘
//!                 ▼
//! ┌──────────────────────────────┐     ┌───────────────────┐
//! │ GameStore                    │────►│ GameApiClient     │──► candy-server
//! │  token present? server first │     └───────────────────┘
//! │  otherwise guest             │────►│ LocalStorage      │──► files / memory
//! └──────────────────────────────┘     └───────────────────┘
//! ```
//!
//! # Guest Mode
//!
//! Without a token, or when the server answers 401/403, everything is kept in
//! [`LocalStorage`] and no error is reported. Other failures are logged and
//! returned as [`StoreError`].
//!
//! # Local Keys
//!
//! | Key | Contents |
//! |-----|----------|
//! | `cosmic-candy-factory-save` | The game document |
//! | `cosmic-candy-factory-migrated` | `"true"` once a v1 save was upgraded |
//! | `auth_token` | Bearer token |

#![deny(missing_docs)]

/// HTTP client for the game routes.
pub mod api;

/// Client configuration.
pub mod config;

/// Error types.
pub mod error;

/// Timer-driven game runtime.
pub mod runtime;

/// Key/value storage backends.
pub mod storage;

/// Save/load/sync with guest fallback.
pub mod store;

pub use api::{GameApiClient, RemoteGame, SyncResult};
pub use config::ClientConfig;
pub use error::{ClientError, Result, StoreError};
pub use runtime::{GameRuntime, GameRuntimeBuilder, GameRuntimeConfig, RuntimeOptions};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use store::{GameStore, SyncOutcome};
