// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Network synergy between producing planets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planet::{PlanetId, PlanetState};

/// Synergy state stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSynergy {
    /// Unlocked planets with non-zero production.
    pub active_planets: u32,
    /// Production multiplier.
    pub multiplier: f64,
}

impl Default for NetworkSynergy {
    fn default() -> Self {
        Self {
            active_planets: 0,
            multiplier: 1.0,
        }
    }
}

impl NetworkSynergy {
    /// Recompute from the current planets.
    pub fn compute(planets: &BTreeMap<PlanetId, PlanetState>) -> Self {
        let active = planets
            .values()
            .filter(|p| p.unlocked && p.production_per_second > 0.0)
            .count();
        Self {
            active_planets: active as u32,
            multiplier: synergy_multiplier(active),
        }
    }

    /// Click power gets the square root of the production multiplier.
    pub fn click_multiplier(&self) -> f64 {
        self.multiplier.max(0.0).sqrt()
    }
}

/// Multiplier for a number of producing planets.
pub fn synergy_multiplier(active_planets: usize) -> f64 {
    match active_planets {
        0 | 1 => 1.0,
        2 => 1.10,
        3 => 1.20,
        4 => 1.35,
        5 => 1.55,
        _ => 1.80,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synergy_table() {
        let table: Vec<f64> = (0..=6).map(synergy_multiplier).collect();
        assert_eq!(table, vec![1.0, 1.0, 1.10, 1.20, 1.35, 1.55, 1.80]);
    }

    #[test]
    fn test_compute_counts_only_unlocked_producers() {
        let mut planets = BTreeMap::new();
        for id in PlanetId::ALL {
            planets.insert(id, PlanetState::new(id, 0));
        }
        planets.get_mut(&PlanetId::Sweet).unwrap().production_per_second = 3.0;
        // Locked planets never count, even with a stale rate.
        planets.get_mut(&PlanetId::Bitter).unwrap().production_per_second = 9.0;
        let sour = planets.get_mut(&PlanetId::Sour).unwrap();
        sour.unlocked = true;
        sour.production_per_second = 1.0;

        let synergy = NetworkSynergy::compute(&planets);
        assert_eq!(synergy.active_planets, 2);
        assert_eq!(synergy.multiplier, 1.10);
        assert!((synergy.click_multiplier() - 1.10f64.sqrt()).abs() < 1e-12);
    }
}
