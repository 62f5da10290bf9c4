// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Trade routes and cross-planet recipes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planet::PlanetId;

/// Candy charged on the source planet to open a route.
pub const TRADE_ROUTE_COST: f64 = 1_000.0;
/// Candy received per candy sent.
pub const EXCHANGE_RATIO: f64 = 0.5;
/// Global production bonus per crafted recipe.
pub const RECIPE_BONUS_PER_CRAFT: f64 = 0.05;

/// A standing transfer of candy between two planets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRoute {
    /// `"{from}-{to}"`.
    pub id: String,
    /// Source planet.
    pub from: PlanetId,
    /// Destination planet.
    pub to: PlanetId,
    /// Candy per second taken from the source.
    pub rate: f64,
    /// Candy received per candy sent.
    #[serde(default = "default_exchange_ratio")]
    pub exchange_ratio: f64,
    /// Paused routes move nothing.
    #[serde(default)]
    pub active: bool,
    /// Candy delivered so far.
    #[serde(default)]
    pub total_transferred: f64,
    /// When the route last moved candy (ms since epoch).
    #[serde(default)]
    pub last_transfer: i64,
}

fn default_exchange_ratio() -> f64 {
    EXCHANGE_RATIO
}

/// Route identifier for a planet pair.
pub fn route_id(from: PlanetId, to: PlanetId) -> String {
    format!("{}-{}", from, to)
}

impl TradeRoute {
    /// A new active route.
    pub fn new(from: PlanetId, to: PlanetId, rate: f64, now: i64) -> Self {
        Self {
            id: route_id(from, to),
            from,
            to,
            rate,
            exchange_ratio: EXCHANGE_RATIO,
            active: true,
            total_transferred: 0.0,
            last_transfer: now,
        }
    }

    /// Candy to take from the source over `dt_secs`, limited by `available`.
    pub fn outgoing(&self, dt_secs: f64, available: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        (self.rate * dt_secs).min(available).max(0.0)
    }
}

/// A static cross-planet recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDefinition {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Candy consumed from each planet.
    pub ingredients: &'static [(PlanetId, f64)],
}

/// Crafting record stored in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeProgress {
    /// Number of crafts.
    pub crafted: u32,
}

/// All cross-planet recipes.
pub static RECIPES: &[RecipeDefinition] = &[
    RecipeDefinition {
        id: "sour_patch_swirl",
        name: "Sour Patch Swirl",
        ingredients: &[(PlanetId::Sweet, 5_000.0), (PlanetId::Sour, 2_000.0)],
    },
    RecipeDefinition {
        id: "frozen_fireball",
        name: "Frozen Fireball",
        ingredients: &[(PlanetId::Cold, 10_000.0), (PlanetId::Spicy, 10_000.0)],
    },
    RecipeDefinition {
        id: "fizzy_sherbet",
        name: "Fizzy Sherbet",
        ingredients: &[
            (PlanetId::Sweet, 20_000.0),
            (PlanetId::Sour, 10_000.0),
            (PlanetId::Fizzy, 5_000.0),
        ],
    },
    RecipeDefinition {
        id: "cosmic_truffle",
        name: "Cosmic Truffle",
        ingredients: &[
            (PlanetId::Sweet, 25_000.0),
            (PlanetId::Sour, 25_000.0),
            (PlanetId::Cold, 25_000.0),
            (PlanetId::Spicy, 25_000.0),
            (PlanetId::Fizzy, 25_000.0),
            (PlanetId::Bitter, 10_000.0),
        ],
    },
];

/// Look up a recipe by id.
pub fn find_recipe(id: &str) -> Option<&'static RecipeDefinition> {
    RECIPES.iter().find(|def| def.id == id)
}

/// `1 + 0.05 * total crafts`.
pub fn recipe_bonus(progress: &BTreeMap<String, RecipeProgress>) -> f64 {
    let crafts: u32 = progress.values().map(|p| p.crafted).sum();
    1.0 + RECIPE_BONUS_PER_CRAFT * crafts as f64
}
