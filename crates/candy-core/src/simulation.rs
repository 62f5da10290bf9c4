// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The seam between game models and the timer-driven runtime.
//!
//! Both the multi-planet [`PlanetSystem`](crate::planet_system::PlanetSystem)
//! and the legacy [`CandyFactory`](crate::factory::CandyFactory) implement
//! [`Simulation`], so a single runtime can drive either of them.

use serde_json::Value;

use crate::migration::MigrationError;

/// Longest wall-clock gap credited in a single update (24 hours).
pub const MAX_CATCH_UP_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Longest slice of a catch-up during which mechanic multipliers are held
/// constant.
pub const CATCH_UP_STEP_MS: i64 = 1_000;

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// High-frequency tick (~60 fps) for the planet the player is looking at.
    Active,
    /// Low-frequency tick (~1 fps) for background planets, trade routes and synergy.
    Inactive,
}

/// A game model that can be advanced by timers and persisted as a JSON document.
pub trait Simulation: Send + 'static {
    /// Immutable copy published to subscribers after every change.
    type Snapshot: Clone + Send + Sync + 'static;

    /// Short name used in log fields.
    const NAME: &'static str;

    /// Create a brand new game.
    fn fresh(now: i64) -> Self
    where
        Self: Sized;

    /// Restore a game from a stored document, upgrading it if needed.
    fn from_document(doc: Value, now: i64) -> Result<Self, MigrationError>
    where
        Self: Sized;

    /// Serialize the whole game for storage.
    fn to_document(&self) -> Result<Value, serde_json::Error>;

    /// Advance the simulation to `now`.
    fn tick(&mut self, cadence: Cadence, now: i64);

    /// Copy of the current state for subscribers.
    fn snapshot(&self) -> Self::Snapshot;

    /// Lifetime earnings, the key used for sync conflict resolution.
    fn total_candy_earned(&self) -> f64;

    /// Record a successful save.
    fn mark_saved(&mut self, now: i64);
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Seconds between two millisecond timestamps, clamped to `[0, MAX_CATCH_UP_SECS]`.
pub fn elapsed_secs(last: i64, now: i64) -> f64 {
    let millis = now.saturating_sub(last).max(0);
    (millis as f64 / 1000.0).min(MAX_CATCH_UP_SECS)
}
