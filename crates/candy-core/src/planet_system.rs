// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Multi-planet game model.
//!
//! [`PlanetSystem`] owns an [`EnhancedGameState`] and applies player actions and
//! timer ticks to it. Two cadences drive it:
//!
//! - [`PlanetSystem::tick_active`] advances only the planet the player is
//!   looking at, with full production credit.
//! - [`PlanetSystem::tick_inactive`] advances every other unlocked planet at
//!   80% credit, moves candy along trade routes, recomputes network synergy
//!   and checks achievements.
//!
//! The flat legacy fields stay meaningful for older readers: `candy`,
//! `upgrades` and `clickPower` mirror the sweet planet, `productionPerSecond`
//! is the sum over unlocked planets, and `totalCandyEarned`/`totalClicks` are
//! aggregates over all planets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::achievements::{FLAG_OVERHEATED, FLAG_PLANET_UNLOCKED, FLAG_SUGAR_RUSH, Reward};
use crate::error::{GameError, Result, ensure_finite};
use crate::migration::{
    MigrationError, fill_defaults, migrate_single_to_multi_planet, upgrade_document,
};
use crate::planet::{MechanicEvent, MechanicTick, PlanetId, PlanetMechanics, PlanetState};
use crate::simulation::{CATCH_UP_STEP_MS, Cadence, Simulation, elapsed_secs};
use crate::state::{GameState, ProgressEvents};
use crate::synergy::NetworkSynergy;
use crate::trade::{
    RecipeProgress, TRADE_ROUTE_COST, TradeRoute, find_recipe, recipe_bonus, route_id,
};
use crate::upgrades::{base_stats, catalog_for, find_upgrade};

/// Document version of multi-planet saves.
pub const MULTI_PLANET_GAME_VERSION: u32 = 2;

/// Share of production credited to planets the player is not looking at.
pub const INACTIVE_PRODUCTION_CREDIT: f64 = 0.8;

/// Multi-planet game document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedGameState {
    /// Flat fields shared with version 1 documents.
    #[serde(flatten)]
    pub legacy: GameState,
    /// Always true once migrated.
    #[serde(default)]
    pub is_multi_planet: bool,
    /// The planet receiving high-frequency updates.
    #[serde(default)]
    pub current_planet: PlanetId,
    /// Exactly the six planets after default filling.
    #[serde(default)]
    pub planets: BTreeMap<PlanetId, PlanetState>,
    /// Recipe id to crafting record.
    #[serde(default)]
    pub cross_planet_recipes: BTreeMap<String, RecipeProgress>,
    /// Route id to route.
    #[serde(default)]
    pub trade_routes: BTreeMap<String, TradeRoute>,
    /// Synergy from the last low-frequency tick.
    #[serde(default)]
    pub network_synergy: NetworkSynergy,
}

impl EnhancedGameState {
    /// A brand new multi-planet game.
    pub fn new(now: i64) -> Self {
        migrate_single_to_multi_planet(GameState::new(now), now)
    }

    /// A planet by id.
    pub fn planet(&self, id: PlanetId) -> Option<&PlanetState> {
        self.planets.get(&id)
    }
}

/// Authoritative multi-planet game model.
#[derive(Debug, Clone)]
pub struct PlanetSystem {
    state: EnhancedGameState,
}

/// Recompute a planet's click power and production. Returns base production
/// before mechanic and bonus multipliers.
fn refresh_planet_stats(planet: &mut PlanetState, bonus: Reward) -> f64 {
    let base = base_stats(catalog_for(planet.id), &planet.upgrades);
    let levels = planet.total_upgrade_levels();
    if let PlanetMechanics::Bitter(m) = &mut planet.special_mechanics {
        m.complexity = levels;
    }
    planet.click_power = base.click_power * bonus.click;
    planet.production_per_second =
        base.production * planet.special_mechanics.production_multiplier() * bonus.production;
    base.production
}

impl PlanetSystem {
    /// A brand new game.
    pub fn new(now: i64) -> Self {
        Self::from_state(EnhancedGameState::new(now), now)
    }

    /// Take ownership of a loaded state, filling defaults and refreshing
    /// derived stats.
    pub fn from_state(mut state: EnhancedGameState, now: i64) -> Self {
        fill_defaults(&mut state, now);
        let mut system = Self { state };
        system.recalculate();
        system
    }

    /// Current state.
    pub fn state(&self) -> &EnhancedGameState {
        &self.state
    }

    /// Give up ownership of the state.
    pub fn into_state(self) -> EnhancedGameState {
        self.state
    }

    /// The planet receiving high-frequency updates.
    pub fn current_planet(&self) -> PlanetId {
        self.state.current_planet
    }

    /// A planet by id.
    pub fn planet(&self, id: PlanetId) -> Option<&PlanetState> {
        self.state.planets.get(&id)
    }

    /// Start over.
    pub fn reset(&mut self, now: i64) {
        info!("Resetting planet system");
        *self = Self::new(now);
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    /// Click on the current planet. Returns the candy gained.
    pub fn click(&mut self, now: i64) -> Result<f64> {
        let current = self.state.current_planet;
        let bonus = self.global_bonus();
        let planet = self.unlocked_planet_mut(current)?;

        let gained = planet.click_power;
        planet.candy += gained;
        planet.total_candy_earned += gained;
        planet.total_clicks += 1;
        let events = planet.special_mechanics.on_click(now);
        if !events.is_empty() {
            refresh_planet_stats(planet, bonus);
        }

        self.state.legacy.total_candy_earned += gained;
        self.state.legacy.total_clicks += 1;
        self.record_events(&events);
        self.sync_legacy_mirror();
        Ok(gained)
    }

    /// Buy one level of an upgrade on the current planet. Returns the new level.
    pub fn purchase_upgrade(&mut self, upgrade_id: &str) -> Result<u32> {
        let current = self.state.current_planet;
        let def = find_upgrade(catalog_for(current), upgrade_id)
            .ok_or_else(|| GameError::UnknownUpgrade(upgrade_id.to_string()))?;
        if def.unlock_at > self.state.legacy.total_candy_earned {
            return Err(GameError::UpgradeLocked(upgrade_id.to_string()));
        }

        let bonus = self.global_bonus();
        let planet = self.unlocked_planet_mut(current)?;
        let level = planet.upgrade_level(def.id);
        let cost = def.cost(level);
        if planet.candy < cost {
            return Err(GameError::InsufficientCandy {
                needed: cost,
                available: planet.candy,
            });
        }

        planet.candy -= cost;
        planet.upgrades.insert(def.id.to_string(), level + 1);
        refresh_planet_stats(planet, bonus);
        debug!(planet = %current, upgrade = def.id, level = level + 1, cost, "Upgrade purchased");

        self.sync_legacy_mirror();
        Ok(level + 1)
    }

    /// Unlock a planet once lifetime earnings reach its threshold.
    pub fn unlock_planet(&mut self, id: PlanetId, now: i64) -> Result<()> {
        let total = self.state.legacy.total_candy_earned;
        let planet = self.planet_entry(id);
        if planet.unlocked {
            return Err(GameError::PlanetAlreadyUnlocked(id));
        }
        let required = id.unlock_requirement();
        if total < required {
            return Err(GameError::UnlockRequirementNotMet {
                planet: id,
                required,
            });
        }

        planet.unlocked = true;
        planet.last_update = now;
        self.state.legacy.set_flag(FLAG_PLANET_UNLOCKED);
        info!(planet = %id, total_candy_earned = total, "Planet unlocked");
        Ok(())
    }

    /// Make another unlocked planet the active one.
    ///
    /// The old planet is settled up to `now` at full credit and the new one at
    /// background credit, so no time is credited twice.
    pub fn switch_planet(&mut self, id: PlanetId, now: i64) -> Result<()> {
        if !self.planet(id).is_some_and(|p| p.unlocked) {
            return Err(GameError::PlanetLocked(id));
        }
        let previous = self.state.current_planet;
        if previous == id {
            return Ok(());
        }

        self.advance_planet(previous, now, 1.0);
        self.advance_planet(id, now, INACTIVE_PRODUCTION_CREDIT);
        self.state.current_planet = id;
        self.sync_legacy_mirror();
        debug!(from = %previous, to = %id, "Switched planet");
        Ok(())
    }

    /// Shift the sour planet's pH. Returns the new pH.
    pub fn adjust_ph(&mut self, delta: f64) -> Result<f64> {
        let delta = ensure_finite("delta", delta)?;
        let ph = match self.mechanics_mut(PlanetId::Sour)? {
            PlanetMechanics::Sour(m) => m.adjust(delta),
            _ => return Err(GameError::MechanicUnavailable(PlanetId::Sour)),
        };
        self.refresh_stats(PlanetId::Sour);
        Ok(ph)
    }

    /// Warm the frozen planet. Returns the new temperature.
    pub fn warm(&mut self, amount: f64) -> Result<f64> {
        let amount = ensure_finite("amount", amount)?;
        match self.mechanics_mut(PlanetId::Cold)? {
            PlanetMechanics::Cold(m) => Ok(m.warm(amount)),
            _ => Err(GameError::MechanicUnavailable(PlanetId::Cold)),
        }
    }

    /// Turn all crystals into candy. Returns the candy paid out.
    pub fn harvest_crystals(&mut self) -> Result<f64> {
        let planet = self.unlocked_planet_mut(PlanetId::Cold)?;
        let PlanetMechanics::Cold(m) = &mut planet.special_mechanics else {
            return Err(GameError::MechanicUnavailable(PlanetId::Cold));
        };
        let crystals = m.crystallized_candy;
        let value = m.harvest();
        // Crystals were already counted as earnings when produced.
        let gain = value - crystals;
        planet.candy += value;
        planet.total_candy_earned += gain;
        self.state.legacy.total_candy_earned += gain;
        self.sync_legacy_mirror();
        Ok(value)
    }

    /// Vent heat on the spicy planet. Returns the new heat level.
    pub fn cool_down(&mut self) -> Result<f64> {
        let heat = match self.mechanics_mut(PlanetId::Spicy)? {
            PlanetMechanics::Spicy(m) => m.cool_down(),
            _ => return Err(GameError::MechanicUnavailable(PlanetId::Spicy)),
        };
        self.refresh_stats(PlanetId::Spicy);
        Ok(heat)
    }

    /// Release the fizzy planet's pressure early. Returns the bonus paid out.
    pub fn release_pressure(&mut self) -> Result<f64> {
        let planet = self.unlocked_planet_mut(PlanetId::Fizzy)?;
        let base = base_stats(catalog_for(PlanetId::Fizzy), &planet.upgrades).production;
        let PlanetMechanics::Fizzy(m) = &mut planet.special_mechanics else {
            return Err(GameError::MechanicUnavailable(PlanetId::Fizzy));
        };
        let bonus = m.release(base);
        planet.candy += bonus;
        planet.total_candy_earned += bonus;
        self.state.legacy.total_candy_earned += bonus;
        self.refresh_stats(PlanetId::Fizzy);
        Ok(bonus)
    }

    /// Open a trade route, paying its cost from the source planet. Returns the
    /// route id.
    pub fn establish_trade_route(
        &mut self,
        from: PlanetId,
        to: PlanetId,
        rate: f64,
        now: i64,
    ) -> Result<String> {
        if from == to {
            return Err(GameError::InvalidTradeRoute(
                "source and destination must differ".to_string(),
            ));
        }
        let rate = ensure_finite("rate", rate)?;
        if rate <= 0.0 {
            return Err(GameError::InvalidValue {
                field: "rate",
                message: "must be greater than zero".to_string(),
            });
        }
        if !self.planet(to).is_some_and(|p| p.unlocked) {
            return Err(GameError::PlanetLocked(to));
        }
        let id = route_id(from, to);
        if self.state.trade_routes.contains_key(&id) {
            return Err(GameError::InvalidTradeRoute(format!(
                "route '{}' already exists",
                id
            )));
        }

        let source = self.unlocked_planet_mut(from)?;
        if source.candy < TRADE_ROUTE_COST {
            return Err(GameError::InsufficientCandy {
                needed: TRADE_ROUTE_COST,
                available: source.candy,
            });
        }
        source.candy -= TRADE_ROUTE_COST;

        self.state
            .trade_routes
            .insert(id.clone(), TradeRoute::new(from, to, rate, now));
        self.sync_legacy_mirror();
        info!(route = %id, rate, "Trade route established");
        Ok(id)
    }

    /// Pause or resume a route. Returns whether it is now active.
    pub fn toggle_trade_route(&mut self, id: &str, now: i64) -> Result<bool> {
        let route = self
            .state
            .trade_routes
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownTradeRoute(id.to_string()))?;
        route.active = !route.active;
        route.last_transfer = now;
        Ok(route.active)
    }

    /// Craft a cross-planet recipe. Returns how many times it has been crafted.
    pub fn craft_recipe(&mut self, recipe_id: &str) -> Result<u32> {
        let def =
            find_recipe(recipe_id).ok_or_else(|| GameError::UnknownRecipe(recipe_id.to_string()))?;

        for &(planet_id, amount) in def.ingredients {
            let planet = self
                .planet(planet_id)
                .filter(|p| p.unlocked)
                .ok_or(GameError::PlanetLocked(planet_id))?;
            if planet.candy < amount {
                return Err(GameError::InsufficientCandy {
                    needed: amount,
                    available: planet.candy,
                });
            }
        }

        for &(planet_id, amount) in def.ingredients {
            self.planet_entry(planet_id).candy -= amount;
        }
        let progress = self
            .state
            .cross_planet_recipes
            .entry(def.id.to_string())
            .or_default();
        progress.crafted += 1;
        let crafted = progress.crafted;

        self.recalculate();
        info!(recipe = def.id, crafted, "Recipe crafted");
        Ok(crafted)
    }

    // ------------------------------------------------------------------------
    // Ticks
    // ------------------------------------------------------------------------

    /// High-frequency update of the current planet.
    pub fn tick_active(&mut self, now: i64) -> Vec<MechanicEvent> {
        let current = self.state.current_planet;
        let events = self.advance_planet(current, now, 1.0);
        self.sync_legacy_mirror();
        events
    }

    /// Low-frequency update of background planets, trade routes, synergy and
    /// achievements.
    pub fn tick_inactive(&mut self, now: i64) -> ProgressEvents {
        let current = self.state.current_planet;
        let background: Vec<PlanetId> = self
            .state
            .planets
            .values()
            .filter(|p| p.unlocked && p.id != current)
            .map(|p| p.id)
            .collect();
        for id in background {
            self.advance_planet(id, now, INACTIVE_PRODUCTION_CREDIT);
        }

        self.process_trade_routes(now);
        self.state.network_synergy = NetworkSynergy::compute(&self.state.planets);
        self.sync_legacy_mirror();

        let events = self.state.legacy.refresh_progress(now);
        self.recalculate();
        events
    }

    /// Advance one planet to `now`.
    ///
    /// The gap is replayed in slices of at most [`CATCH_UP_STEP_MS`], with
    /// the mechanic multiplier refreshed between slices, so pH drift, heat,
    /// overheats and sugar rushes change production as they happen.
    fn advance_planet(&mut self, id: PlanetId, now: i64, credit: f64) -> Vec<MechanicEvent> {
        let bonus = self.global_bonus();
        let planet = self.planet_entry(id);
        let dt = elapsed_secs(planet.last_update, now);
        planet.last_update = now;

        let mut base = refresh_planet_stats(planet, bonus);
        if dt <= 0.0 {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut earned = 0.0;
        let mut crystallized = 0.0;
        let mut t = now - (dt * 1000.0).round() as i64;
        while t < now {
            let next = (t + CATCH_UP_STEP_MS).min(now);
            let step_secs = (next - t) as f64 / 1000.0;
            t = next;

            let produced = planet.production_per_second * credit * step_secs;
            planet.candy += produced;
            planet.total_candy_earned += produced;
            earned += produced;

            let tick = MechanicTick {
                dt_secs: step_secs,
                now: t,
                base_production: base * credit,
            };
            for event in planet.special_mechanics.advance(&tick, &mut planet.candy) {
                match event {
                    MechanicEvent::PressureReleased { bonus: burst } => {
                        planet.total_candy_earned += burst;
                        earned += burst;
                        events.push(event);
                    }
                    MechanicEvent::Crystallized { amount } => crystallized += amount,
                    other => events.push(other),
                }
            }
            base = refresh_planet_stats(planet, bonus);
        }
        if crystallized > 0.0 {
            events.push(MechanicEvent::Crystallized {
                amount: crystallized,
            });
        }

        self.state.legacy.total_candy_earned += earned;
        self.record_events(&events);
        events
    }

    fn process_trade_routes(&mut self, now: i64) {
        let planets = &mut self.state.planets;
        for route in self.state.trade_routes.values_mut() {
            let dt = elapsed_secs(route.last_transfer, now);
            route.last_transfer = now;

            let both_unlocked = [route.from, route.to]
                .iter()
                .all(|id| planets.get(id).is_some_and(|p| p.unlocked));
            if !both_unlocked {
                continue;
            }

            let available = planets.get(&route.from).map_or(0.0, |p| p.candy);
            let sent = route.outgoing(dt, available);
            if sent <= 0.0 {
                continue;
            }
            let received = sent * route.exchange_ratio;
            if let Some(source) = planets.get_mut(&route.from) {
                source.candy -= sent;
            }
            if let Some(destination) = planets.get_mut(&route.to) {
                destination.candy += received;
            }
            route.total_transferred += received;
        }
    }

    // ------------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------------

    /// Bonus shared by every planet: achievements, candies, prestige, recipes
    /// and synergy.
    fn global_bonus(&self) -> Reward {
        let synergy = &self.state.network_synergy;
        self.state.legacy.bonus().combine(Reward {
            production: recipe_bonus(&self.state.cross_planet_recipes) * synergy.multiplier,
            click: synergy.click_multiplier(),
        })
    }

    fn refresh_stats(&mut self, id: PlanetId) {
        let bonus = self.global_bonus();
        refresh_planet_stats(self.planet_entry(id), bonus);
        self.sync_legacy_mirror();
    }

    fn recalculate(&mut self) {
        let bonus = self.global_bonus();
        for planet in self.state.planets.values_mut() {
            refresh_planet_stats(planet, bonus);
        }
        self.sync_legacy_mirror();
    }

    fn sync_legacy_mirror(&mut self) {
        let production = self
            .state
            .planets
            .values()
            .filter(|p| p.unlocked)
            .map(|p| p.production_per_second)
            .sum();
        let legacy = &mut self.state.legacy;
        legacy.production_per_second = production;
        if let Some(sweet) = self.state.planets.get(&PlanetId::Sweet) {
            legacy.candy = sweet.candy;
            legacy.click_power = sweet.click_power;
            if legacy.upgrades != sweet.upgrades {
                legacy.upgrades = sweet.upgrades.clone();
            }
        }
    }

    fn record_events(&mut self, events: &[MechanicEvent]) {
        for event in events {
            let flag = match event {
                MechanicEvent::SugarRushStarted => FLAG_SUGAR_RUSH,
                MechanicEvent::Overheated { candy_lost } => {
                    info!(candy_lost, "Spicy planet overheated");
                    FLAG_OVERHEATED
                }
                _ => continue,
            };
            self.state.legacy.set_flag(flag);
        }
    }

    fn planet_entry(&mut self, id: PlanetId) -> &mut PlanetState {
        self.state
            .planets
            .entry(id)
            .or_insert_with(|| PlanetState::new(id, 0))
    }

    fn unlocked_planet_mut(&mut self, id: PlanetId) -> Result<&mut PlanetState> {
        let planet = self.planet_entry(id);
        if planet.unlocked {
            Ok(planet)
        } else {
            Err(GameError::PlanetLocked(id))
        }
    }

    fn mechanics_mut(&mut self, id: PlanetId) -> Result<&mut PlanetMechanics> {
        Ok(&mut self.unlocked_planet_mut(id)?.special_mechanics)
    }
}

impl Simulation for PlanetSystem {
    type Snapshot = EnhancedGameState;

    const NAME: &'static str = "planet_system";

    fn fresh(now: i64) -> Self {
        Self::new(now)
    }

    fn from_document(doc: Value, now: i64) -> std::result::Result<Self, MigrationError> {
        let outcome = upgrade_document(doc, now)?;
        Ok(Self::from_state(outcome.state, now))
    }

    fn to_document(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(&self.state)
    }

    fn tick(&mut self, cadence: Cadence, now: i64) {
        match cadence {
            Cadence::Active => {
                self.tick_active(now);
            }
            Cadence::Inactive => {
                self.tick_inactive(now);
            }
        }
    }

    fn snapshot(&self) -> EnhancedGameState {
        self.state.clone()
    }

    fn total_candy_earned(&self) -> f64 {
        self.state.legacy.total_candy_earned
    }

    fn mark_saved(&mut self, now: i64) {
        self.state.legacy.last_saved = now;
    }
}
