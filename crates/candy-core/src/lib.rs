// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cosmic Candy Factory - Game Model
//!
//! This crate holds everything about the game that does not touch the network
//! or the disk: the save documents, the upgrade/achievement/candy catalogs,
//! planet mechanics, the tick updater, save migration and the sync conflict
//! policy. The server and client crates build on it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────┐        ┌────────────────────────────┐
//! │        candy-client        │  HTTP  │        candy-server        │
//! │  GameRuntime<S> (timers)   │───────►│  /api/app1/game/{state,    │
//! │  GameStore (guest mode)    │        │   sync, achievements}      │
//! └─────────────┬──────────────┘        └─────────────┬──────────────┘
//!               │                                     │
//!               ▼                                     ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     candy-core (this crate)                     │
//! │  Simulation ◄── PlanetSystem / CandyFactory                     │
//! │  upgrade_document (v1 → v2)        resolve_conflict             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Game Models
//!
//! | Model | Document | Cadences |
//! |-------|----------|----------|
//! | [`PlanetSystem`] | [`EnhancedGameState`] (`gameVersion` 2) | active planet every 16 ms; background planets, trade routes, synergy and achievements every 1 s at 80% credit |
//! | [`CandyFactory`] | [`GameState`] (`gameVersion` 1) | production every 16 ms; unlocks and achievements every 1 s |
//!
//! Both implement [`Simulation`], which is all the runtime needs.
//!
//! # Planet Unlock Thresholds
//!
//! Thresholds apply to lifetime candy earned across all planets:
//!
//! | Planet | Threshold | Mechanic |
//! |--------|-----------|----------|
//! | `sweet` | 0 | sweetness gauge and sugar rush |
//! | `sour` | 10 000 | pH drift |
//! | `cold` | 50 000 | temperature and crystallization |
//! | `spicy` | 100 000 | heat and overheat |
//! | `fizzy` | 250 000 | pressure bursts |
//! | `bitter` | 500 000 | complexity scaling |
//!
//! # Modules
//!
//! - [`planet`]: Planet ids, per-planet state and mechanics
//! - [`planet_system`]: Multi-planet model and document
//! - [`factory`]: Legacy single-planet model
//! - [`migration`]: Version 1 to version 2 document upgrade
//! - [`sync`]: Server-side sync conflict policy

#![deny(missing_docs)]

/// Achievement definitions and the unlock engine.
pub mod achievements;

/// Collectible candies and their passive bonuses.
pub mod candies;

/// Error types for rejected player actions.
pub mod error;

/// Legacy single-planet candy factory.
pub mod factory;

/// Save document migration and default filling.
pub mod migration;

/// Planet ids, mechanics and per-planet state.
pub mod planet;

/// Multi-planet game model.
pub mod planet_system;

/// The seam between game models and the timer-driven runtime.
pub mod simulation;

/// Flat game document shared by both models.
pub mod state;

/// Network synergy between producing planets.
pub mod synergy;

/// Sync conflict policy.
pub mod sync;

/// Trade routes and cross-planet recipes.
pub mod trade;

/// Upgrade catalogs and price formula.
pub mod upgrades;

pub use error::{GameError, Result};
pub use factory::CandyFactory;
pub use migration::{MigrationError, MigrationOutcome, upgrade_document};
pub use planet::{PlanetId, PlanetMechanics, PlanetState};
pub use planet_system::{EnhancedGameState, PlanetSystem};
pub use simulation::{Cadence, Simulation, now_ms};
pub use state::GameState;
pub use sync::{SyncWinner, resolve_conflict};
