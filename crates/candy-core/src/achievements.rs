// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Achievement engine.
//!
//! Achievements are static definitions with a requirement predicate and a
//! reward multiplier. [`check_achievements`] unlocks every definition whose
//! requirement is met for the first time and stamps it with the current time.
//! Unlocks are never revoked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Multipliers granted by achievements, candies and prestige.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Production multiplier.
    pub production: f64,
    /// Click power multiplier.
    pub click: f64,
}

impl Reward {
    /// No effect.
    pub const NONE: Reward = Reward {
        production: 1.0,
        click: 1.0,
    };

    /// Production-only multiplier.
    pub const fn production(multiplier: f64) -> Self {
        Self {
            production: multiplier,
            click: 1.0,
        }
    }

    /// Click-only multiplier.
    pub const fn click(multiplier: f64) -> Self {
        Self {
            production: 1.0,
            click: multiplier,
        }
    }

    /// Compound two rewards multiplicatively.
    pub fn combine(self, other: Reward) -> Reward {
        Reward {
            production: self.production * other.production,
            click: self.click * other.click,
        }
    }
}

impl Default for Reward {
    fn default() -> Self {
        Self::NONE
    }
}

/// What must be true for an achievement to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Requirement {
    /// Lifetime candy earned.
    TotalCandy {
        /// Threshold.
        amount: f64,
    },
    /// Lifetime clicks.
    TotalClicks {
        /// Threshold.
        count: u64,
    },
    /// Candy per second.
    ProductionRate {
        /// Threshold.
        per_second: f64,
    },
    /// Level of a single upgrade.
    UpgradeLevel {
        /// Upgrade id.
        upgrade: &'static str,
        /// Level required.
        level: u32,
    },
    /// Number of prestiges.
    PrestigeLevel {
        /// Level required.
        level: u32,
    },
    /// Number of collectible candies discovered.
    CandiesCollected {
        /// Candies required.
        count: usize,
    },
    /// A custom flag set by gameplay events.
    Flag {
        /// Flag name.
        flag: &'static str,
    },
}

/// Player progress checked against requirements.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot<'a> {
    /// Lifetime candy earned.
    pub total_candy_earned: f64,
    /// Lifetime clicks.
    pub total_clicks: u64,
    /// Candy per second.
    pub production_per_second: f64,
    /// Owned upgrade levels.
    pub upgrades: &'a BTreeMap<String, u32>,
    /// Prestige level.
    pub prestige_level: u32,
    /// Discovered collectible candies.
    pub candies_collected: usize,
    /// Custom flags.
    pub flags: &'a [String],
}

impl Requirement {
    /// Whether `progress` satisfies the requirement.
    pub fn is_met(&self, progress: &ProgressSnapshot<'_>) -> bool {
        match *self {
            Self::TotalCandy { amount } => progress.total_candy_earned >= amount,
            Self::TotalClicks { count } => progress.total_clicks >= count,
            Self::ProductionRate { per_second } => progress.production_per_second >= per_second,
            Self::UpgradeLevel { upgrade, level } => {
                progress.upgrades.get(upgrade).copied().unwrap_or(0) >= level
            }
            Self::PrestigeLevel { level } => progress.prestige_level >= level,
            Self::CandiesCollected { count } => progress.candies_collected >= count,
            Self::Flag { flag } => progress.flags.iter().any(|f| f == flag),
        }
    }
}

/// A static achievement entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Unlock condition.
    pub requirement: Requirement,
    /// Permanent bonus once unlocked.
    pub reward: Reward,
}

/// Unlock record stored in save documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementStatus {
    /// Whether the achievement is unlocked.
    pub unlocked: bool,
    /// When it was unlocked (ms since epoch).
    pub unlocked_at: Option<i64>,
}

const fn achievement(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    requirement: Requirement,
    reward: Reward,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        name,
        description,
        requirement,
        reward,
    }
}

/// All achievements.
pub static ACHIEVEMENTS: &[AchievementDefinition] = &[
    achievement("first_click", "First Click", "Click for the very first time.", Requirement::TotalClicks { count: 1 }, Reward::click(1.05)),
    achievement("click_apprentice", "Click Apprentice", "Click 100 times.", Requirement::TotalClicks { count: 100 }, Reward::click(1.1)),
    achievement("click_master", "Click Master", "Click 1,000 times.", Requirement::TotalClicks { count: 1_000 }, Reward::click(1.25)),
    achievement("sweet_tooth", "Sweet Tooth", "Earn 1,000 candy.", Requirement::TotalCandy { amount: 1_000.0 }, Reward::production(1.02)),
    achievement("candy_baron", "Candy Baron", "Earn 100,000 candy.", Requirement::TotalCandy { amount: 100_000.0 }, Reward::production(1.05)),
    achievement("candy_tycoon", "Candy Tycoon", "Earn 10,000,000 candy.", Requirement::TotalCandy { amount: 10_000_000.0 }, Reward::production(1.1)),
    achievement("assembly_line", "Assembly Line", "Produce 10 candy per second.", Requirement::ProductionRate { per_second: 10.0 }, Reward::production(1.05)),
    achievement("mass_production", "Mass Production", "Produce 1,000 candy per second.", Requirement::ProductionRate { per_second: 1_000.0 }, Reward::production(1.1)),
    achievement("machine_collector", "Machine Collector", "Own 10 candy machines.", Requirement::UpgradeLevel { upgrade: "candy_machine", level: 10 }, Reward::production(1.05)),
    achievement("reborn", "Reborn", "Prestige for the first time.", Requirement::PrestigeLevel { level: 1 }, Reward { production: 1.1, click: 1.1 }),
    achievement("collector", "Collector", "Discover 3 collectible candies.", Requirement::CandiesCollected { count: 3 }, Reward::production(1.05)),
    achievement("completionist", "Completionist", "Discover every collectible candy.", Requirement::CandiesCollected { count: 6 }, Reward { production: 1.15, click: 1.15 }),
    achievement("planet_hopper", "Planet Hopper", "Unlock a second planet.", Requirement::Flag { flag: FLAG_PLANET_UNLOCKED }, Reward::production(1.05)),
    achievement("hot_stuff", "Hot Stuff", "Overheat the spicy planet.", Requirement::Flag { flag: FLAG_OVERHEATED }, Reward::click(1.05)),
    achievement("sugar_high", "Sugar High", "Trigger a sugar rush.", Requirement::Flag { flag: FLAG_SUGAR_RUSH }, Reward::click(1.05)),
];

/// Set when the player unlocks any planet beyond the first.
pub const FLAG_PLANET_UNLOCKED: &str = "planet_unlocked";
/// Set when the spicy planet overheats.
pub const FLAG_OVERHEATED: &str = "overheated";
/// Set when a sugar rush starts.
pub const FLAG_SUGAR_RUSH: &str = "sugar_rush";

/// Look up an achievement by id.
pub fn find_achievement(id: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|def| def.id == id)
}

/// Unlock every achievement whose requirement is newly met.
///
/// Returns the ids unlocked by this call.
pub fn check_achievements(
    unlocked: &mut BTreeMap<String, AchievementStatus>,
    progress: &ProgressSnapshot<'_>,
    now: i64,
) -> Vec<&'static str> {
    let mut newly = Vec::new();
    for def in ACHIEVEMENTS {
        if unlocked.get(def.id).is_some_and(|status| status.unlocked) {
            continue;
        }
        if def.requirement.is_met(progress) {
            unlocked.insert(
                def.id.to_string(),
                AchievementStatus {
                    unlocked: true,
                    unlocked_at: Some(now),
                },
            );
            info!(achievement = def.id, "Achievement unlocked");
            newly.push(def.id);
        }
    }
    newly
}

/// Combined reward of all unlocked achievements.
pub fn achievement_bonus(unlocked: &BTreeMap<String, AchievementStatus>) -> Reward {
    ACHIEVEMENTS
        .iter()
        .filter(|def| unlocked.get(def.id).is_some_and(|status| status.unlocked))
        .fold(Reward::NONE, |acc, def| acc.combine(def.reward))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress<'a>(
        upgrades: &'a BTreeMap<String, u32>,
        flags: &'a [String],
    ) -> ProgressSnapshot<'a> {
        ProgressSnapshot {
            total_candy_earned: 0.0,
            total_clicks: 0,
            production_per_second: 0.0,
            upgrades,
            prestige_level: 0,
            candies_collected: 0,
            flags,
        }
    }

    #[test]
    fn test_first_click_unlocks_once() {
        let upgrades = BTreeMap::new();
        let mut p = progress(&upgrades, &[]);
        p.total_clicks = 1;
        let mut unlocked = BTreeMap::new();

        assert_eq!(check_achievements(&mut unlocked, &p, 1_000), vec!["first_click"]);
        assert_eq!(unlocked["first_click"].unlocked_at, Some(1_000));

        // Second check keeps the original timestamp.
        assert!(check_achievements(&mut unlocked, &p, 2_000).is_empty());
        assert_eq!(unlocked["first_click"].unlocked_at, Some(1_000));
    }

    #[test]
    fn test_requirement_kinds() {
        let mut upgrades = BTreeMap::new();
        upgrades.insert("candy_machine".to_string(), 10);
        let flags = vec!["overheated".to_string()];
        let mut p = progress(&upgrades, &flags);
        p.total_candy_earned = 1_000.0;
        p.production_per_second = 10.0;
        p.prestige_level = 1;
        p.candies_collected = 3;

        let mut unlocked = BTreeMap::new();
        let newly = check_achievements(&mut unlocked, &p, 0);

        for id in [
            "sweet_tooth",
            "assembly_line",
            "machine_collector",
            "reborn",
            "collector",
            "hot_stuff",
        ] {
            assert!(newly.contains(&id), "{id} should unlock");
        }
        assert!(!newly.contains(&"candy_baron"));
        assert!(!newly.contains(&"sugar_high"));
    }

    #[test]
    fn test_bonus_compounds_multiplicatively() {
        let mut unlocked = BTreeMap::new();
        assert_eq!(achievement_bonus(&unlocked), Reward::NONE);

        for id in ["first_click", "click_apprentice", "sweet_tooth"] {
            unlocked.insert(
                id.to_string(),
                AchievementStatus {
                    unlocked: true,
                    unlocked_at: Some(0),
                },
            );
        }
        // A stored-but-locked record grants nothing.
        unlocked.insert("candy_baron".to_string(), AchievementStatus::default());

        let bonus = achievement_bonus(&unlocked);
        assert!((bonus.click - 1.05 * 1.1).abs() < 1e-12);
        assert!((bonus.production - 1.02).abs() < 1e-12);
    }

    #[test]
    fn test_achievement_ids_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for def in ACHIEVEMENTS {
            assert!(seen.insert(def.id));
            assert_eq!(find_achievement(def.id), Some(def));
        }
        assert!(find_achievement("nope").is_none());
    }
}
