// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Legacy single-planet game model.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{GameError, Result};
use crate::migration::{MigrationError, json_kind};
use crate::simulation::{Cadence, Simulation, elapsed_secs};
use crate::state::{GameState, ProgressEvents};
use crate::upgrades::{FACTORY_UPGRADES, base_stats, find_upgrade};

/// Candy that must be earned in one run before prestige is allowed.
pub const PRESTIGE_THRESHOLD: f64 = 1_000_000.0;

/// `floor(sqrt(run_earnings / 1_000_000))`.
pub fn prestige_points_for(run_candy_earned: f64) -> f64 {
    (run_candy_earned.max(0.0) / PRESTIGE_THRESHOLD).sqrt().floor()
}

/// The single-planet candy factory.
#[derive(Debug, Clone)]
pub struct CandyFactory {
    state: GameState,
    last_tick: i64,
}

impl CandyFactory {
    /// A fresh factory.
    pub fn new(now: i64) -> Self {
        Self::from_state(GameState::new(now), now)
    }

    /// Resume a saved factory. Time since the last save is credited on the
    /// next tick, capped at 24 hours.
    pub fn from_state(state: GameState, now: i64) -> Self {
        let last_tick = if state.last_saved > 0 {
            state.last_saved.min(now)
        } else {
            now
        };
        let mut factory = Self { state, last_tick };
        factory.recalculate();
        factory
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Gain one click worth of candy. Returns the candy gained.
    pub fn click(&mut self) -> f64 {
        let gained = self.state.click_power;
        self.state.candy += gained;
        self.state.total_candy_earned += gained;
        self.state.total_clicks += 1;
        gained
    }

    /// Buy one level of an upgrade. Returns the new level.
    pub fn purchase_upgrade(&mut self, upgrade_id: &str) -> Result<u32> {
        let def = find_upgrade(FACTORY_UPGRADES, upgrade_id)
            .ok_or_else(|| GameError::UnknownUpgrade(upgrade_id.to_string()))?;
        if def.unlock_at > self.state.total_candy_earned {
            return Err(GameError::UpgradeLocked(upgrade_id.to_string()));
        }

        let level = self.state.upgrade_level(def.id);
        let cost = def.cost(level);
        if self.state.candy < cost {
            return Err(GameError::InsufficientCandy {
                needed: cost,
                available: self.state.candy,
            });
        }

        self.state.candy -= cost;
        self.state.upgrades.insert(def.id.to_string(), level + 1);
        self.recalculate();
        debug!(upgrade = def.id, level = level + 1, cost, "Upgrade purchased");
        Ok(level + 1)
    }

    /// Credit production up to `now`.
    pub fn produce(&mut self, now: i64) -> f64 {
        let dt = elapsed_secs(self.last_tick, now);
        self.last_tick = now;
        let produced = self.state.production_per_second * dt;
        self.state.candy += produced;
        self.state.total_candy_earned += produced;
        produced
    }

    /// Credit production, then reveal upgrades, discover candies and check
    /// achievements.
    pub fn tick(&mut self, now: i64) -> ProgressEvents {
        self.produce(now);
        let events = self.state.refresh_progress(now);
        if !events.achievements.is_empty() || !events.candies.is_empty() {
            self.recalculate();
        }
        events
    }

    /// Prestige points a prestige would award right now.
    pub fn prestige_points_available(&self) -> f64 {
        prestige_points_for(self.state.run_candy_earned())
    }

    /// Whether this run has earned enough to prestige.
    pub fn can_prestige(&self) -> bool {
        self.state.run_candy_earned() >= PRESTIGE_THRESHOLD
    }

    /// Reset the run for prestige points. Achievements and candies are kept.
    /// Returns the points awarded.
    pub fn prestige(&mut self, now: i64) -> Result<f64> {
        if !self.can_prestige() {
            return Err(GameError::PrestigeUnavailable {
                required: PRESTIGE_THRESHOLD,
            });
        }

        let points = self.prestige_points_available();
        let state = &mut self.state;
        state.prestige_level += 1;
        state.prestige_points += points;
        state.prestige_candy_baseline = state.total_candy_earned;
        state.candy = 0.0;
        state.upgrades.clear();
        state.unlocked_upgrades.clear();

        self.last_tick = now;
        self.state.refresh_progress(now);
        self.recalculate();
        info!(
            prestige_level = self.state.prestige_level,
            points, "Prestiged"
        );
        Ok(points)
    }

    /// Start over, dropping all progress.
    pub fn reset(&mut self, now: i64) {
        info!("Resetting candy factory");
        *self = Self::new(now);
    }

    fn recalculate(&mut self) {
        let base = base_stats(FACTORY_UPGRADES, &self.state.upgrades);
        let bonus = self.state.bonus();
        self.state.click_power = base.click_power * bonus.click;
        self.state.production_per_second = base.production * bonus.production;
    }
}

impl Simulation for CandyFactory {
    type Snapshot = GameState;

    const NAME: &'static str = "candy_factory";

    fn fresh(now: i64) -> Self {
        Self::new(now)
    }

    fn from_document(doc: Value, now: i64) -> std::result::Result<Self, MigrationError> {
        if !doc.is_object() {
            return Err(MigrationError::NotAnObject(json_kind(&doc)));
        }
        let state: GameState = serde_json::from_value(doc)?;
        Ok(Self::from_state(state, now))
    }

    fn to_document(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(&self.state)
    }

    fn tick(&mut self, cadence: Cadence, now: i64) {
        match cadence {
            Cadence::Active => {
                self.produce(now);
            }
            Cadence::Inactive => {
                CandyFactory::tick(self, now);
            }
        }
    }

    fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    fn total_candy_earned(&self) -> f64 {
        self.state.total_candy_earned
    }

    fn mark_saved(&mut self, now: i64) {
        self.state.last_saved = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_click_from_zero() {
        let mut factory = CandyFactory::new(T0);
        assert_eq!(factory.state().candy, 0.0);
        assert_eq!(factory.state().click_power, 1.0);

        factory.click();

        assert_eq!(factory.state().candy, 1.0);
        assert_eq!(factory.state().total_clicks, 1);
        assert_eq!(factory.state().total_candy_earned, 1.0);
    }

    #[test]
    fn test_first_upgrade_costs_base_price() {
        let mut factory = CandyFactory::new(T0);
        for _ in 0..15 {
            factory.click();
        }
        assert_eq!(factory.purchase_upgrade("sugar_spoon"), Ok(1));
        assert_eq!(factory.state().candy, 0.0);
        assert_eq!(factory.state().click_power, 2.0);

        assert_eq!(
            factory.purchase_upgrade("sugar_spoon"),
            Err(GameError::InsufficientCandy {
                needed: 17.0,
                available: 0.0
            })
        );
    }

    #[test]
    fn test_locked_and_unknown_upgrades() {
        let mut factory = CandyFactory::new(T0);
        assert_eq!(
            factory.purchase_upgrade("gummy_press"),
            Err(GameError::UpgradeLocked("gummy_press".to_string()))
        );
        assert_eq!(
            factory.purchase_upgrade("lemon_grove"),
            Err(GameError::UnknownUpgrade("lemon_grove".to_string()))
        );
    }

    #[test]
    fn test_tick_produces_and_unlocks() {
        let mut factory = CandyFactory::new(T0);
        factory.state.candy = 100.0;
        factory.purchase_upgrade("candy_machine").unwrap();
        assert_eq!(factory.state().production_per_second, 1.0);

        let events = factory.tick(T0 + 100_000);

        assert!((factory.state().candy - 100.0).abs() < 1e-9);
        assert!(events.candies.contains(&"gumdrop"));
        assert!(events.upgrades.contains(&"sugar_spoon"));
    }

    #[test]
    fn test_offline_progress_from_last_save() {
        let mut state = GameState::new(T0);
        state.upgrades.insert("candy_machine".to_string(), 1);
        state.last_saved = T0;
        let mut factory = CandyFactory::from_state(state, T0 + 60_000);

        factory.produce(T0 + 60_000);

        assert!((factory.state().candy - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_prestige() {
        let mut factory = CandyFactory::new(T0);
        assert_eq!(
            factory.prestige(T0),
            Err(GameError::PrestigeUnavailable {
                required: PRESTIGE_THRESHOLD
            })
        );

        factory.state.total_candy_earned = 4_200_000.0;
        factory.state.candy = 50_000.0;
        factory.state.upgrades.insert("candy_machine".to_string(), 20);
        factory.state.unlocked_candies.push("gumdrop".to_string());

        assert_eq!(factory.prestige_points_available(), 2.0);
        assert_eq!(factory.prestige(T0 + 1), Ok(2.0));

        let state = factory.state();
        assert_eq!(state.prestige_level, 1);
        assert_eq!(state.prestige_points, 2.0);
        assert_eq!(state.candy, 0.0);
        assert!(state.upgrades.is_empty());
        assert!(state.unlocked_candies.contains(&"gumdrop".to_string()));
        assert!(state.achievements["reborn"].unlocked);
        // Lifetime earnings never go down.
        assert_eq!(state.total_candy_earned, 4_200_000.0);
        assert!(!factory.can_prestige());
    }

    #[test]
    fn test_prestige_points_formula() {
        assert_eq!(prestige_points_for(999_999.0), 0.0);
        assert_eq!(prestige_points_for(1_000_000.0), 1.0);
        assert_eq!(prestige_points_for(3_999_999.0), 1.0);
        assert_eq!(prestige_points_for(9_000_000.0), 3.0);
    }

    #[test]
    fn test_reset() {
        let mut factory = CandyFactory::new(T0);
        factory.click();
        factory.reset(T0 + 1);
        assert_eq!(factory.state(), &GameState::new(T0 + 1));
    }

    #[test]
    fn test_simulation_document_round_trip() {
        let mut factory = CandyFactory::new(T0);
        factory.click();
        let doc = factory.to_document().unwrap();
        assert_eq!(doc["candy"], 1.0);
        let restored = CandyFactory::from_document(doc, T0).unwrap();
        assert_eq!(restored.state(), factory.state());
        assert!(matches!(
            CandyFactory::from_document(Value::Null, T0),
            Err(MigrationError::NotAnObject("null"))
        ));
    }
}
