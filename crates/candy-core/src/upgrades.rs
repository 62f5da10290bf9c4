// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Upgrade catalogs.
//!
//! The legacy factory and the sweet planet share [`FACTORY_UPGRADES`]; every
//! other planet has its own small catalog. Prices grow by 15% per level.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::planet::PlanetId;

/// Price growth per purchased level.
pub const COST_GROWTH: f64 = 1.15;

/// What an upgrade adds per level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "camelCase")]
pub enum UpgradeEffect {
    /// Candy per click.
    Click(f64),
    /// Candy per second.
    Production(f64),
}

/// A static upgrade entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeDefinition {
    /// Stable identifier stored in save documents.
    pub id: &'static str,
    /// Shop name.
    pub name: &'static str,
    /// Shop description.
    pub description: &'static str,
    /// Price of the first level.
    pub base_price: f64,
    /// Effect per level.
    pub effect: UpgradeEffect,
    /// Lifetime candy earned before the upgrade shows up in the shop.
    pub unlock_at: f64,
}

impl UpgradeDefinition {
    /// Price of the next level when `level` levels are owned.
    pub fn cost(&self, level: u32) -> f64 {
        upgrade_cost(self.base_price, level)
    }
}

/// `floor(base_price * 1.15^level)`.
pub fn upgrade_cost(base_price: f64, level: u32) -> f64 {
    (base_price * COST_GROWTH.powi(level as i32)).floor()
}

const fn upgrade(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    base_price: f64,
    effect: UpgradeEffect,
    unlock_at: f64,
) -> UpgradeDefinition {
    UpgradeDefinition {
        id,
        name,
        description,
        base_price,
        effect,
        unlock_at,
    }
}

/// Upgrades of the legacy factory and the sweet planet.
pub static FACTORY_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("sugar_spoon", "Sugar Spoon", "Stir harder. +1 candy per click.", 15.0, UpgradeEffect::Click(1.0), 0.0),
    upgrade("candy_machine", "Candy Machine", "A humble machine. +1 candy per second.", 100.0, UpgradeEffect::Production(1.0), 0.0),
    upgrade("gummy_press", "Gummy Press", "Squeezes out gummies. +8 candy per second.", 1_100.0, UpgradeEffect::Production(8.0), 500.0),
    upgrade("caramel_mixer", "Caramel Mixer", "Sticky clicks. +5 candy per click.", 5_000.0, UpgradeEffect::Click(5.0), 2_000.0),
    upgrade("chocolate_river", "Chocolate River", "Flows day and night. +47 candy per second.", 12_000.0, UpgradeEffect::Production(47.0), 6_000.0),
    upgrade("lollipop_lab", "Lollipop Lab", "Scientific swirls. +260 candy per second.", 130_000.0, UpgradeEffect::Production(260.0), 60_000.0),
    upgrade("cosmic_whisk", "Cosmic Whisk", "Whisks stardust. +50 candy per click.", 250_000.0, UpgradeEffect::Click(50.0), 100_000.0),
    upgrade("candy_portal", "Candy Portal", "Imports candy from elsewhere. +1400 candy per second.", 1_400_000.0, UpgradeEffect::Production(1_400.0), 700_000.0),
];

static SOUR_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("sour_drop", "Sour Drop", "Puckering clicks. +2 candy per click.", 150.0, UpgradeEffect::Click(2.0), 0.0),
    upgrade("lemon_grove", "Lemon Grove", "Zesty orchards. +5 candy per second.", 1_000.0, UpgradeEffect::Production(5.0), 0.0),
    upgrade("acid_vat", "Acid Vat", "Bubbling sourness. +40 candy per second.", 12_000.0, UpgradeEffect::Production(40.0), 0.0),
];

static COLD_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("frost_pick", "Frost Pick", "Chips ice candy. +3 candy per click.", 500.0, UpgradeEffect::Click(3.0), 0.0),
    upgrade("ice_harvester", "Ice Harvester", "Cuts glacier blocks. +12 candy per second.", 5_000.0, UpgradeEffect::Production(12.0), 0.0),
    upgrade("glacier_plant", "Glacier Plant", "Industrial freezing. +90 candy per second.", 60_000.0, UpgradeEffect::Production(90.0), 0.0),
];

static SPICY_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("chili_grinder", "Chili Grinder", "Fiery clicks. +5 candy per click.", 1_000.0, UpgradeEffect::Click(5.0), 0.0),
    upgrade("pepper_farm", "Pepper Farm", "Rows of peppers. +25 candy per second.", 10_000.0, UpgradeEffect::Production(25.0), 0.0),
    upgrade("lava_oven", "Lava Oven", "Bakes with magma. +180 candy per second.", 120_000.0, UpgradeEffect::Production(180.0), 0.0),
];

static FIZZY_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("bubble_wand", "Bubble Wand", "Pops candy bubbles. +8 candy per click.", 2_500.0, UpgradeEffect::Click(8.0), 0.0),
    upgrade("soda_fountain", "Soda Fountain", "Endless fizz. +60 candy per second.", 25_000.0, UpgradeEffect::Production(60.0), 0.0),
    upgrade("geyser_tap", "Geyser Tap", "Taps a carbonated geyser. +400 candy per second.", 300_000.0, UpgradeEffect::Production(400.0), 0.0),
];

static BITTER_UPGRADES: &[UpgradeDefinition] = &[
    upgrade("cocoa_press", "Cocoa Press", "Dark clicks. +12 candy per click.", 5_000.0, UpgradeEffect::Click(12.0), 0.0),
    upgrade("bitter_root_farm", "Bitter Root Farm", "An acquired taste. +120 candy per second.", 50_000.0, UpgradeEffect::Production(120.0), 0.0),
    upgrade("alchemy_still", "Alchemy Still", "Distills pure bitterness. +900 candy per second.", 600_000.0, UpgradeEffect::Production(900.0), 0.0),
];

/// Upgrade catalog of a planet.
pub fn catalog_for(planet: PlanetId) -> &'static [UpgradeDefinition] {
    match planet {
        PlanetId::Sweet => FACTORY_UPGRADES,
        PlanetId::Sour => SOUR_UPGRADES,
        PlanetId::Cold => COLD_UPGRADES,
        PlanetId::Spicy => SPICY_UPGRADES,
        PlanetId::Fizzy => FIZZY_UPGRADES,
        PlanetId::Bitter => BITTER_UPGRADES,
    }
}

/// Look up an upgrade in a catalog.
pub fn find_upgrade(
    catalog: &'static [UpgradeDefinition],
    id: &str,
) -> Option<&'static UpgradeDefinition> {
    catalog.iter().find(|def| def.id == id)
}

/// Click power and production before any multipliers.
///
/// Click power starts at 1; production starts at 0. Ids missing from the
/// catalog are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    /// Candy per click.
    pub click_power: f64,
    /// Candy per second.
    pub production: f64,
}

/// Sum the effects of owned upgrade levels.
pub fn base_stats(catalog: &[UpgradeDefinition], owned: &BTreeMap<String, u32>) -> BaseStats {
    let mut stats = BaseStats {
        click_power: 1.0,
        production: 0.0,
    };
    for def in catalog {
        let level = owned.get(def.id).copied().unwrap_or(0) as f64;
        match def.effect {
            UpgradeEffect::Click(amount) => stats.click_power += amount * level,
            UpgradeEffect::Production(amount) => stats.production += amount * level,
        }
    }
    stats
}
