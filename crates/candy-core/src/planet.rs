// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Planets and their special mechanics.
//!
//! Every planet is an independent progression track with its own currency,
//! upgrades and one mechanic. The mechanic is a tagged enum serialized with a
//! `"type"` discriminator that always matches the owning planet's id:
//!
//! | Planet | Mechanic | Production effect |
//! |--------|----------|-------------------|
//! | `sweet` | sweetness gauge, sugar rush | 2x for 30 s when the gauge fills |
//! | `sour` | pH drift | 1.0 in [4.0, 6.5], 0.5 below, 0.7 above |
//! | `cold` | temperature, crystallization | candy converts to 10x crystals below -5 °C |
//! | `spicy` | heat, overheat | `1.05^heat`; at 100 lose half the candy, 0.5x for 60 s |
//! | `fizzy` | pressure | `1 + pressure/200`; bursts at 100 |
//! | `bitter` | complexity | `1 + 0.02 * levels`, capped at 3x |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GameError;

// ============================================================================
// Planet Identifiers
// ============================================================================

/// One of the six fixed planets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanetId {
    /// Home planet, unlocked from the start.
    #[default]
    Sweet,
    /// Acidic planet with pH drift.
    Sour,
    /// Frozen planet with crystallization.
    Cold,
    /// Hot planet with heat buildup.
    Spicy,
    /// Carbonated planet with pressure bursts.
    Fizzy,
    /// Late-game planet with complexity scaling.
    Bitter,
}

impl PlanetId {
    /// All planets in unlock order.
    pub const ALL: [PlanetId; 6] = [
        PlanetId::Sweet,
        PlanetId::Sour,
        PlanetId::Cold,
        PlanetId::Spicy,
        PlanetId::Fizzy,
        PlanetId::Bitter,
    ];

    /// Identifier used in JSON documents and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sweet => "sweet",
            Self::Sour => "sour",
            Self::Cold => "cold",
            Self::Spicy => "spicy",
            Self::Fizzy => "fizzy",
            Self::Bitter => "bitter",
        }
    }

    /// Human-readable planet name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sweet => "Sweet Planet",
            Self::Sour => "Sour Planet",
            Self::Cold => "Frozen Planet",
            Self::Spicy => "Spicy Planet",
            Self::Fizzy => "Fizzy Planet",
            Self::Bitter => "Bitter Planet",
        }
    }

    /// Lifetime candy earned (across all planets) needed to unlock this planet.
    pub fn unlock_requirement(&self) -> f64 {
        match self {
            Self::Sweet => 0.0,
            Self::Sour => 10_000.0,
            Self::Cold => 50_000.0,
            Self::Spicy => 100_000.0,
            Self::Fizzy => 250_000.0,
            Self::Bitter => 500_000.0,
        }
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanetId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanetId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| GameError::UnknownPlanet(s.to_string()))
    }
}

// ============================================================================
// Timed Effects
// ============================================================================

/// A temporary state (sugar rush, overheat) that ends at a fixed time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimedEffect {
    /// Whether the effect is currently running.
    pub active: bool,
    /// When the effect ends (ms since epoch).
    pub ends_at: Option<i64>,
}

impl TimedEffect {
    /// Start the effect for `duration_ms`.
    pub fn start(&mut self, now: i64, duration_ms: i64) {
        self.active = true;
        self.ends_at = Some(now + duration_ms);
    }

    /// End the effect if its time is up. Returns true when it just ended.
    pub fn expire(&mut self, now: i64) -> bool {
        if !self.active {
            return false;
        }
        match self.ends_at {
            Some(ends_at) if now < ends_at => false,
            _ => {
                self.active = false;
                self.ends_at = None;
                true
            }
        }
    }

    /// Milliseconds left, zero when inactive.
    pub fn remaining_ms(&self, now: i64) -> i64 {
        match (self.active, self.ends_at) {
            (true, Some(ends_at)) => (ends_at - now).max(0),
            _ => 0,
        }
    }
}

// ============================================================================
// Mechanics
// ============================================================================

/// Gauge ceiling for the sweetness meter.
pub const SWEETNESS_MAX: f64 = 100.0;
/// Sweetness gained per click on the sweet planet.
pub const SWEETNESS_PER_CLICK: f64 = 2.0;
/// Sweetness gained per second while producing.
pub const SWEETNESS_PER_SECOND: f64 = 1.0;
/// Sugar rush duration.
pub const SUGAR_RUSH_MS: i64 = 30_000;
/// Production multiplier during a sugar rush.
pub const SUGAR_RUSH_MULTIPLIER: f64 = 2.0;

/// Starting pH of the sour planet.
pub const PH_NEUTRAL: f64 = 7.0;
/// pH lost per minute of drift.
pub const PH_DRIFT_PER_MINUTE: f64 = 0.1;
/// Lower bound of the optimal pH band (inclusive).
pub const PH_OPTIMAL_MIN: f64 = 4.0;
/// Upper bound of the optimal pH band (inclusive).
pub const PH_OPTIMAL_MAX: f64 = 6.5;
/// Lowest possible pH.
pub const PH_MIN: f64 = 0.0;
/// Highest possible pH.
pub const PH_MAX: f64 = 14.0;

/// Starting temperature of the frozen planet (°C).
pub const COLD_START_TEMPERATURE: f64 = 5.0;
/// Temperature the frozen planet drifts toward (°C).
pub const COLD_TARGET_TEMPERATURE: f64 = -10.0;
/// Degrees lost per second while above the target.
pub const COLD_DRIFT_PER_SECOND: f64 = 0.5;
/// Crystallization starts below this temperature (°C).
pub const CRYSTALLIZE_BELOW: f64 = -5.0;
/// Share of banked candy crystallized per second.
pub const CRYSTALLIZE_RATE: f64 = 0.01;
/// Candy value of one crystal when harvested.
pub const CRYSTAL_VALUE: f64 = 10.0;
/// Warming cannot push the planet above this temperature (°C).
pub const COLD_MAX_TEMPERATURE: f64 = 20.0;

/// Heat ceiling; reaching it triggers an overheat.
pub const HEAT_MAX: f64 = 100.0;
/// Heat gained per second while producing.
pub const HEAT_GAIN_PER_SECOND: f64 = 1.0;
/// Heat lost per second while idle or overheated.
pub const HEAT_DECAY_PER_SECOND: f64 = 2.0;
/// Base of the exponential heat multiplier.
pub const HEAT_MULTIPLIER_BASE: f64 = 1.05;
/// Heat removed by one manual cool-down.
pub const COOL_DOWN_AMOUNT: f64 = 20.0;
/// Overheat duration.
pub const OVERHEAT_MS: i64 = 60_000;
/// Production factor while overheated.
pub const OVERHEAT_PRODUCTION_FACTOR: f64 = 0.5;
/// Share of banked candy destroyed by an overheat.
pub const OVERHEAT_CANDY_LOSS: f64 = 0.5;

/// Pressure ceiling; reaching it releases a burst.
pub const PRESSURE_MAX: f64 = 100.0;
/// Pressure gained per second while producing.
pub const PRESSURE_GAIN_PER_SECOND: f64 = 0.5;
/// A full burst pays out this many seconds of base production.
pub const PRESSURE_BURST_SECONDS: f64 = 10.0;

/// Production bonus per bitter upgrade level.
pub const COMPLEXITY_BONUS_PER_LEVEL: f64 = 0.02;
/// Maximum bitter production multiplier.
pub const COMPLEXITY_MAX_MULTIPLIER: f64 = 3.0;

/// Production modifier for a given pH.
///
/// 1.0 inside the optimal band `[4.0, 6.5]`, 0.5 when too acidic, 0.7 when
/// too alkaline.
pub fn ph_modifier(ph: f64) -> f64 {
    if ph < PH_OPTIMAL_MIN {
        0.5
    } else if ph > PH_OPTIMAL_MAX {
        0.7
    } else {
        1.0
    }
}

/// Production multiplier for a given heat level.
pub fn heat_multiplier(heat: f64) -> f64 {
    HEAT_MULTIPLIER_BASE.powf(heat.clamp(0.0, HEAT_MAX))
}

/// Sweet planet state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SweetMechanics {
    /// Sweetness gauge, 0–100.
    pub sweetness: f64,
    /// Active sugar rush, if any.
    pub sugar_rush: TimedEffect,
    /// Number of sugar rushes triggered.
    pub rush_count: u32,
}

/// Sour planet state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourMechanics {
    /// Current pH, 0–14.
    pub ph: f64,
}

impl Default for SourMechanics {
    fn default() -> Self {
        Self { ph: PH_NEUTRAL }
    }
}

/// Frozen planet state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColdMechanics {
    /// Temperature in °C.
    pub temperature: f64,
    /// Crystals waiting to be harvested.
    pub crystallized_candy: f64,
}

impl Default for ColdMechanics {
    fn default() -> Self {
        Self {
            temperature: COLD_START_TEMPERATURE,
            crystallized_candy: 0.0,
        }
    }
}

/// Spicy planet state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpicyMechanics {
    /// Heat level, 0–100.
    pub heat_level: f64,
    /// Active overheat, if any.
    pub overheat: TimedEffect,
    /// Number of overheats suffered.
    pub overheat_count: u32,
}

/// Fizzy planet state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FizzyMechanics {
    /// Pressure, 0–100.
    pub pressure: f64,
    /// Number of bursts released.
    pub releases: u32,
}

/// Bitter planet state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BitterMechanics {
    /// Total bitter upgrade levels.
    pub complexity: u32,
}

/// Something a mechanic did during an update.
#[derive(Debug, Clone, PartialEq)]
pub enum MechanicEvent {
    /// The sweetness gauge filled up.
    SugarRushStarted,
    /// The sugar rush ran out.
    SugarRushEnded,
    /// Heat reached the ceiling.
    Overheated {
        /// Candy destroyed by the overheat.
        candy_lost: f64,
    },
    /// The overheat penalty ran out.
    OverheatEnded,
    /// Pressure was released as bonus candy.
    PressureReleased {
        /// Candy paid out.
        bonus: f64,
    },
    /// Banked candy turned into crystals.
    Crystallized {
        /// Candy moved into crystals.
        amount: f64,
    },
}

/// Inputs to one mechanic update.
#[derive(Debug, Clone, Copy)]
pub struct MechanicTick {
    /// Seconds since the planet's last update.
    pub dt_secs: f64,
    /// Current time (ms since epoch).
    pub now: i64,
    /// Production before mechanic and bonus multipliers, already scaled for
    /// inactive planets.
    pub base_production: f64,
}

impl MechanicTick {
    fn producing(&self) -> bool {
        self.base_production > 0.0
    }
}

/// The special mechanic of a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlanetMechanics {
    /// Sweetness and sugar rush.
    Sweet(SweetMechanics),
    /// pH drift.
    Sour(SourMechanics),
    /// Temperature and crystallization.
    Cold(ColdMechanics),
    /// Heat and overheat.
    Spicy(SpicyMechanics),
    /// Pressure bursts.
    Fizzy(FizzyMechanics),
    /// Complexity scaling.
    Bitter(BitterMechanics),
}

impl Default for PlanetMechanics {
    fn default() -> Self {
        Self::for_planet(PlanetId::Sweet)
    }
}

impl PlanetMechanics {
    /// Fresh mechanic state for a planet.
    pub fn for_planet(planet: PlanetId) -> Self {
        match planet {
            PlanetId::Sweet => Self::Sweet(SweetMechanics::default()),
            PlanetId::Sour => Self::Sour(SourMechanics::default()),
            PlanetId::Cold => Self::Cold(ColdMechanics::default()),
            PlanetId::Spicy => Self::Spicy(SpicyMechanics::default()),
            PlanetId::Fizzy => Self::Fizzy(FizzyMechanics::default()),
            PlanetId::Bitter => Self::Bitter(BitterMechanics::default()),
        }
    }

    /// The planet this mechanic belongs to.
    pub fn planet(&self) -> PlanetId {
        match self {
            Self::Sweet(_) => PlanetId::Sweet,
            Self::Sour(_) => PlanetId::Sour,
            Self::Cold(_) => PlanetId::Cold,
            Self::Spicy(_) => PlanetId::Spicy,
            Self::Fizzy(_) => PlanetId::Fizzy,
            Self::Bitter(_) => PlanetId::Bitter,
        }
    }

    /// Current production multiplier from the mechanic.
    pub fn production_multiplier(&self) -> f64 {
        match self {
            Self::Sweet(m) if m.sugar_rush.active => SUGAR_RUSH_MULTIPLIER,
            Self::Sweet(_) => 1.0,
            Self::Sour(m) => ph_modifier(m.ph),
            Self::Cold(_) => 1.0,
            Self::Spicy(m) if m.overheat.active => {
                heat_multiplier(m.heat_level) * OVERHEAT_PRODUCTION_FACTOR
            }
            Self::Spicy(m) => heat_multiplier(m.heat_level),
            Self::Fizzy(m) => 1.0 + m.pressure / (2.0 * PRESSURE_MAX),
            Self::Bitter(m) => (1.0 + COMPLEXITY_BONUS_PER_LEVEL * m.complexity as f64)
                .min(COMPLEXITY_MAX_MULTIPLIER),
        }
    }

    /// React to a click on the owning planet.
    pub fn on_click(&mut self, now: i64) -> Vec<MechanicEvent> {
        let mut events = Vec::new();
        if let Self::Sweet(m) = self {
            if m.sugar_rush.active {
                return events;
            }
            m.sweetness = (m.sweetness + SWEETNESS_PER_CLICK).min(SWEETNESS_MAX);
            if m.try_start_rush(now) {
                events.push(MechanicEvent::SugarRushStarted);
            }
        }
        events
    }

    /// Advance the mechanic by `tick.dt_secs`.
    ///
    /// `candy` is the owning planet's bank; overheats, crystallization and
    /// pressure bursts move candy in or out of it directly.
    pub fn advance(&mut self, tick: &MechanicTick, candy: &mut f64) -> Vec<MechanicEvent> {
        let mut events = Vec::new();
        match self {
            Self::Sweet(m) => {
                if m.sugar_rush.expire(tick.now) {
                    events.push(MechanicEvent::SugarRushEnded);
                }
                if tick.producing() && !m.sugar_rush.active {
                    m.sweetness =
                        (m.sweetness + SWEETNESS_PER_SECOND * tick.dt_secs).min(SWEETNESS_MAX);
                    if m.try_start_rush(tick.now) {
                        events.push(MechanicEvent::SugarRushStarted);
                    }
                }
            }
            Self::Sour(m) => {
                m.ph = (m.ph - PH_DRIFT_PER_MINUTE * tick.dt_secs / 60.0).max(PH_MIN);
            }
            Self::Cold(m) => {
                if m.temperature > COLD_TARGET_TEMPERATURE {
                    m.temperature = (m.temperature - COLD_DRIFT_PER_SECOND * tick.dt_secs)
                        .max(COLD_TARGET_TEMPERATURE);
                }
                if m.temperature < CRYSTALLIZE_BELOW && *candy > 0.0 {
                    let amount = *candy * (CRYSTALLIZE_RATE * tick.dt_secs).min(1.0);
                    if amount > 0.0 {
                        *candy -= amount;
                        m.crystallized_candy += amount;
                        events.push(MechanicEvent::Crystallized { amount });
                    }
                }
            }
            Self::Spicy(m) => {
                if m.overheat.expire(tick.now) {
                    events.push(MechanicEvent::OverheatEnded);
                }
                let delta = if tick.producing() && !m.overheat.active {
                    HEAT_GAIN_PER_SECOND * tick.dt_secs
                } else {
                    -HEAT_DECAY_PER_SECOND * tick.dt_secs
                };
                if let Some(event) = m.apply_heat(delta, tick.now, candy) {
                    events.push(event);
                }
            }
            Self::Fizzy(m) => {
                if tick.producing() {
                    m.pressure += PRESSURE_GAIN_PER_SECOND * tick.dt_secs;
                    if m.pressure >= PRESSURE_MAX {
                        let bonus = m.release(tick.base_production);
                        *candy += bonus;
                        events.push(MechanicEvent::PressureReleased { bonus });
                    }
                }
            }
            Self::Bitter(_) => {}
        }
        events
    }
}

impl SweetMechanics {
    fn try_start_rush(&mut self, now: i64) -> bool {
        if self.sweetness < SWEETNESS_MAX || self.sugar_rush.active {
            return false;
        }
        self.sugar_rush.start(now, SUGAR_RUSH_MS);
        self.sweetness = 0.0;
        self.rush_count += 1;
        debug!(rush_count = self.rush_count, "Sugar rush started");
        true
    }
}

impl SourMechanics {
    /// Shift the pH by `delta`, clamped to `[0, 14]`.
    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.ph = (self.ph + delta).clamp(PH_MIN, PH_MAX);
        self.ph
    }
}

impl ColdMechanics {
    /// Raise the temperature, capped at 20 °C.
    pub fn warm(&mut self, amount: f64) -> f64 {
        self.temperature = (self.temperature + amount.max(0.0)).min(COLD_MAX_TEMPERATURE);
        self.temperature
    }

    /// Take all crystals out, returning their candy value.
    pub fn harvest(&mut self) -> f64 {
        let value = self.crystallized_candy * CRYSTAL_VALUE;
        self.crystallized_candy = 0.0;
        value
    }
}

impl SpicyMechanics {
    /// Change the heat level, clamped to `[0, 100]`.
    ///
    /// Reaching 100 starts an overheat: heat drops to zero, half of `candy` is
    /// destroyed and production is halved for 60 seconds. Heat cannot rise
    /// while an overheat is running.
    pub fn apply_heat(&mut self, delta: f64, now: i64, candy: &mut f64) -> Option<MechanicEvent> {
        if self.overheat.active {
            self.heat_level = (self.heat_level + delta.min(0.0)).clamp(0.0, HEAT_MAX);
            return None;
        }

        self.heat_level = (self.heat_level + delta).clamp(0.0, HEAT_MAX);
        if self.heat_level < HEAT_MAX {
            return None;
        }

        let candy_lost = *candy * OVERHEAT_CANDY_LOSS;
        *candy -= candy_lost;
        self.heat_level = 0.0;
        self.overheat.start(now, OVERHEAT_MS);
        self.overheat_count += 1;
        debug!(candy_lost, overheat_count = self.overheat_count, "Overheated");
        Some(MechanicEvent::Overheated { candy_lost })
    }

    /// Remove [`COOL_DOWN_AMOUNT`] heat.
    pub fn cool_down(&mut self) -> f64 {
        self.heat_level = (self.heat_level - COOL_DOWN_AMOUNT).max(0.0);
        self.heat_level
    }
}

impl FizzyMechanics {
    /// Release all pressure. A full tank pays ten seconds of `base_production`.
    pub fn release(&mut self, base_production: f64) -> f64 {
        let fill = (self.pressure / PRESSURE_MAX).clamp(0.0, 1.0);
        let bonus = base_production.max(0.0) * PRESSURE_BURST_SECONDS * fill;
        self.pressure = 0.0;
        self.releases += 1;
        bonus
    }
}

// ============================================================================
// Planet State
// ============================================================================

/// Per-planet progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanetState {
    /// Planet identifier.
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// Whether the player has unlocked the planet.
    pub unlocked: bool,
    /// Lifetime candy needed to unlock.
    pub unlock_requirement: f64,
    /// Banked candy on this planet.
    pub candy: f64,
    /// Candy produced on this planet, ever.
    pub total_candy_earned: f64,
    /// Effective candy per click.
    pub click_power: f64,
    /// Effective candy per second.
    pub production_per_second: f64,
    /// Clicks made on this planet.
    pub total_clicks: u64,
    /// Upgrade id to level.
    pub upgrades: BTreeMap<String, u32>,
    /// When the planet was last advanced (ms since epoch).
    pub last_update: i64,
    /// The planet's mechanic.
    pub special_mechanics: PlanetMechanics,
}

impl Default for PlanetState {
    fn default() -> Self {
        Self {
            unlocked: false,
            ..Self::new(PlanetId::Sweet, 0)
        }
    }
}

impl PlanetState {
    /// Fresh planet. Only the sweet planet starts unlocked.
    pub fn new(id: PlanetId, now: i64) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            unlocked: id == PlanetId::Sweet,
            unlock_requirement: id.unlock_requirement(),
            candy: 0.0,
            total_candy_earned: 0.0,
            click_power: 1.0,
            production_per_second: 0.0,
            total_clicks: 0,
            upgrades: BTreeMap::new(),
            last_update: now,
            special_mechanics: PlanetMechanics::for_planet(id),
        }
    }

    /// Level of an upgrade on this planet.
    pub fn upgrade_level(&self, upgrade_id: &str) -> u32 {
        self.upgrades.get(upgrade_id).copied().unwrap_or(0)
    }

    /// Sum of all upgrade levels on this planet.
    pub fn total_upgrade_levels(&self) -> u32 {
        self.upgrades.values().sum()
    }
}
