// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The flat game document shared by both game models.
//!
//! Version 1 documents contain only these fields. Version 2 documents embed
//! them (flattened) and add the planet fields, so everything here keeps its
//! camelCase JSON name and defaults when absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::achievements::{
    AchievementStatus, ProgressSnapshot, Reward, achievement_bonus, check_achievements,
};
use crate::candies::{candy_bonus, discover_candies};
use crate::upgrades::FACTORY_UPGRADES;

/// Document version of flat single-planet saves.
pub const LEGACY_GAME_VERSION: u32 = 1;

/// Production and click bonus per prestige level.
pub const PRESTIGE_BONUS_PER_LEVEL: f64 = 0.1;

/// Flat single-planet game document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Current currency.
    pub candy: f64,
    /// Lifetime earnings; sync conflict key.
    pub total_candy_earned: f64,
    /// Candy per click.
    pub click_power: f64,
    /// Candy per second.
    pub production_per_second: f64,
    /// Lifetime clicks.
    pub total_clicks: u64,
    /// Upgrade id to level.
    pub upgrades: BTreeMap<String, u32>,
    /// Upgrades visible in the shop.
    pub unlocked_upgrades: Vec<String>,
    /// Achievement unlock records.
    pub achievements: BTreeMap<String, AchievementStatus>,
    /// Discovered collectible candies.
    pub unlocked_candies: Vec<String>,
    /// Custom achievement flags.
    pub flags: Vec<String>,
    /// Number of prestiges.
    pub prestige_level: u32,
    /// Prestige points collected.
    pub prestige_points: f64,
    /// `totalCandyEarned` at the moment of the last prestige.
    pub prestige_candy_baseline: f64,
    /// Game start (ms since epoch).
    pub start_time: i64,
    /// Last save (ms since epoch).
    pub last_saved: i64,
    /// Document version.
    pub game_version: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// What a progress refresh unlocked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressEvents {
    /// Newly unlocked achievements.
    pub achievements: Vec<&'static str>,
    /// Newly discovered candies.
    pub candies: Vec<&'static str>,
    /// Upgrades that just appeared in the shop.
    pub upgrades: Vec<&'static str>,
}

impl ProgressEvents {
    /// Whether nothing was unlocked.
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty() && self.candies.is_empty() && self.upgrades.is_empty()
    }
}

impl GameState {
    /// A fresh game started at `now`.
    pub fn new(now: i64) -> Self {
        Self {
            candy: 0.0,
            total_candy_earned: 0.0,
            click_power: 1.0,
            production_per_second: 0.0,
            total_clicks: 0,
            upgrades: BTreeMap::new(),
            unlocked_upgrades: Vec::new(),
            achievements: BTreeMap::new(),
            unlocked_candies: Vec::new(),
            flags: Vec::new(),
            prestige_level: 0,
            prestige_points: 0.0,
            prestige_candy_baseline: 0.0,
            start_time: now,
            last_saved: 0,
            game_version: LEGACY_GAME_VERSION,
        }
    }

    /// Level of a factory upgrade.
    pub fn upgrade_level(&self, upgrade_id: &str) -> u32 {
        self.upgrades.get(upgrade_id).copied().unwrap_or(0)
    }

    /// Candy earned since the last prestige.
    pub fn run_candy_earned(&self) -> f64 {
        (self.total_candy_earned - self.prestige_candy_baseline).max(0.0)
    }

    /// `1 + 0.1 * prestige_level`.
    pub fn prestige_multiplier(&self) -> f64 {
        1.0 + PRESTIGE_BONUS_PER_LEVEL * self.prestige_level as f64
    }

    /// Achievements, candies and prestige compounded.
    pub fn bonus(&self) -> Reward {
        let prestige = self.prestige_multiplier();
        achievement_bonus(&self.achievements)
            .combine(candy_bonus(&self.unlocked_candies))
            .combine(Reward {
                production: prestige,
                click: prestige,
            })
    }

    /// Whether a custom flag is set.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Set a custom flag. Returns false when it was already set.
    pub fn set_flag(&mut self, flag: &str) -> bool {
        if self.has_flag(flag) {
            return false;
        }
        self.flags.push(flag.to_string());
        true
    }

    /// Progress as seen by achievement requirements.
    pub fn progress(&self) -> ProgressSnapshot<'_> {
        ProgressSnapshot {
            total_candy_earned: self.total_candy_earned,
            total_clicks: self.total_clicks,
            production_per_second: self.production_per_second,
            upgrades: &self.upgrades,
            prestige_level: self.prestige_level,
            candies_collected: self.unlocked_candies.len(),
            flags: &self.flags,
        }
    }

    /// Reveal upgrades, discover candies and unlock achievements.
    pub fn refresh_progress(&mut self, now: i64) -> ProgressEvents {
        let mut events = ProgressEvents::default();

        for def in FACTORY_UPGRADES {
            if self.total_candy_earned >= def.unlock_at
                && !self.unlocked_upgrades.iter().any(|id| id == def.id)
            {
                self.unlocked_upgrades.push(def.id.to_string());
                events.upgrades.push(def.id);
            }
        }

        events.candies = discover_candies(&mut self.unlocked_candies, self.total_candy_earned);

        let mut achievements = std::mem::take(&mut self.achievements);
        events.achievements = check_achievements(&mut achievements, &self.progress(), now);
        self.achievements = achievements;

        events
    }
}
