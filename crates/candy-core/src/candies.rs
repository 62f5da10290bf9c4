// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Collectible candies discovered by lifetime earnings.

use serde::Serialize;
use tracing::info;

use crate::achievements::Reward;

/// A static collectible candy entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyDefinition {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Flavor text.
    pub description: &'static str,
    /// Lifetime candy earned needed to discover it.
    pub discover_at: f64,
    /// Passive bonus while owned.
    pub reward: Reward,
}

/// All collectible candies, cheapest first.
pub static CANDIES: &[CandyDefinition] = &[
    CandyDefinition {
        id: "gumdrop",
        name: "Gumdrop",
        description: "Soft, round and surprisingly bouncy.",
        discover_at: 100.0,
        reward: Reward::click(1.02),
    },
    CandyDefinition {
        id: "jelly_bean",
        name: "Jelly Bean",
        description: "Every color tastes a little different.",
        discover_at: 1_000.0,
        reward: Reward::production(1.02),
    },
    CandyDefinition {
        id: "candy_cane",
        name: "Candy Cane",
        description: "Striped for aerodynamic stirring.",
        discover_at: 10_000.0,
        reward: Reward::production(1.03),
    },
    CandyDefinition {
        id: "rock_candy",
        name: "Rock Candy",
        description: "Sugar crystals grown on a string.",
        discover_at: 100_000.0,
        reward: Reward::click(1.05),
    },
    CandyDefinition {
        id: "star_drop",
        name: "Star Drop",
        description: "Fell from the candy nebula.",
        discover_at: 1_000_000.0,
        reward: Reward::production(1.05),
    },
    CandyDefinition {
        id: "nebula_truffle",
        name: "Nebula Truffle",
        description: "A whole galaxy in one bite.",
        discover_at: 10_000_000.0,
        reward: Reward {
            production: 1.1,
            click: 1.1,
        },
    },
];

/// Add every candy whose threshold is reached to `owned`.
///
/// Returns the ids discovered by this call.
pub fn discover_candies(owned: &mut Vec<String>, total_candy_earned: f64) -> Vec<&'static str> {
    let mut found = Vec::new();
    for def in CANDIES {
        if total_candy_earned >= def.discover_at && !owned.iter().any(|id| id == def.id) {
            owned.push(def.id.to_string());
            info!(candy = def.id, "Collectible candy discovered");
            found.push(def.id);
        }
    }
    found
}

/// Combined passive bonus of owned candies. Unknown ids are ignored.
pub fn candy_bonus(owned: &[String]) -> Reward {
    CANDIES
        .iter()
        .filter(|def| owned.iter().any(|id| id == def.id))
        .fold(Reward::NONE, |acc, def| acc.combine(def.reward))
}
