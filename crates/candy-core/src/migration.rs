// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Save document migration.
//!
//! Version 1 documents are flat single-planet saves. Version 2 documents carry
//! `isMultiPlanet: true` and six nested planets. [`upgrade_document`] accepts
//! either, so every load path runs through it; upgrading an already upgraded
//! document only fills missing defaults.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::planet::{PlanetId, PlanetMechanics, PlanetState};
use crate::planet_system::{EnhancedGameState, MULTI_PLANET_GAME_VERSION};
use crate::state::GameState;
use crate::synergy::NetworkSynergy;

/// Errors raised while reading a stored game document.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The document is not a JSON object.
    #[error("Game document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A field has the wrong type.
    #[error("Malformed game document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result of [`upgrade_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    /// The multi-planet state.
    pub state: EnhancedGameState,
    /// True when the input was a version 1 document.
    pub migrated: bool,
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a raw document is already in the multi-planet format.
pub fn is_multi_planet(doc: &Value) -> bool {
    doc.get("isMultiPlanet").and_then(Value::as_bool) == Some(true)
        || doc
            .get("gameVersion")
            .and_then(Value::as_u64)
            .is_some_and(|v| v >= MULTI_PLANET_GAME_VERSION as u64)
}

/// Reshape a flat save into the multi-planet format.
///
/// The sweet planet inherits the legacy economy; the other five planets start
/// locked with their unlock thresholds.
pub fn migrate_single_to_multi_planet(legacy: GameState, now: i64) -> EnhancedGameState {
    let mut planets = BTreeMap::new();
    for id in PlanetId::ALL {
        planets.insert(id, PlanetState::new(id, now));
    }
    if let Some(sweet) = planets.get_mut(&PlanetId::Sweet) {
        sweet.candy = legacy.candy;
        sweet.total_candy_earned = legacy.total_candy_earned;
        sweet.click_power = legacy.click_power;
        sweet.production_per_second = legacy.production_per_second;
        sweet.total_clicks = legacy.total_clicks;
        sweet.upgrades = legacy.upgrades.clone();
    }

    let network_synergy = NetworkSynergy::compute(&planets);
    let mut legacy = legacy;
    legacy.game_version = MULTI_PLANET_GAME_VERSION;

    EnhancedGameState {
        legacy,
        is_multi_planet: true,
        current_planet: PlanetId::Sweet,
        planets,
        cross_planet_recipes: BTreeMap::new(),
        trade_routes: BTreeMap::new(),
        network_synergy,
    }
}

/// Load any stored document as a multi-planet state.
pub fn upgrade_document(doc: Value, now: i64) -> Result<MigrationOutcome, MigrationError> {
    if !doc.is_object() {
        return Err(MigrationError::NotAnObject(json_kind(&doc)));
    }

    if is_multi_planet(&doc) {
        let mut state: EnhancedGameState = serde_json::from_value(doc)?;
        fill_defaults(&mut state, now);
        return Ok(MigrationOutcome {
            state,
            migrated: false,
        });
    }

    let legacy: GameState = serde_json::from_value(doc)?;
    info!(
        candy = legacy.candy,
        total_candy_earned = legacy.total_candy_earned,
        "Migrating single-planet save to multi-planet format"
    );
    let mut state = migrate_single_to_multi_planet(legacy, now);
    fill_defaults(&mut state, now);
    Ok(MigrationOutcome {
        state,
        migrated: true,
    })
}

/// Repair a multi-planet state so every invariant holds.
///
/// Restores missing planets and keeps each planet's id, name and mechanic in
/// line with its map key. The sweet planet is always unlocked; a locked
/// current planet sends the player back to it.
pub fn fill_defaults(state: &mut EnhancedGameState, now: i64) {
    state.is_multi_planet = true;
    if state.legacy.game_version < MULTI_PLANET_GAME_VERSION {
        state.legacy.game_version = MULTI_PLANET_GAME_VERSION;
    }

    for id in PlanetId::ALL {
        let planet = state
            .planets
            .entry(id)
            .or_insert_with(|| PlanetState::new(id, now));
        planet.id = id;
        if planet.special_mechanics.planet() != id {
            warn!(planet = %id, "Replacing mismatched planet mechanics");
            planet.special_mechanics = PlanetMechanics::for_planet(id);
        }
        if planet.name != id.display_name() {
            planet.name = id.display_name().to_string();
        }
        planet.unlock_requirement = id.unlock_requirement();
        if id == PlanetId::Sweet {
            planet.unlocked = true;
        }
        if planet.last_update <= 0 {
            planet.last_update = now;
        }
    }

    for (id, route) in state.trade_routes.iter_mut() {
        if &route.id != id {
            route.id = id.clone();
        }
    }

    let current = state.current_planet;
    if !state.planets.get(&current).is_some_and(|p| p.unlocked) {
        warn!(planet = %current, "Current planet is locked, returning to sweet");
        state.current_planet = PlanetId::Sweet;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T0: i64 = 1_700_000_000_000;

    fn legacy_doc() -> Value {
        json!({
            "candy": 1234.5,
            "totalCandyEarned": 98765.0,
            "clickPower": 6.0,
            "productionPerSecond": 12.0,
            "totalClicks": 321,
            "upgrades": {"sugar_spoon": 5, "candy_machine": 3},
            "achievements": {"first_click": {"unlocked": true, "unlockedAt": 1000}},
            "prestigeLevel": 1,
            "startTime": 1000,
            "lastSaved": 2000,
            "gameVersion": 1
        })
    }

    #[test]
    fn test_migration_moves_legacy_economy_to_sweet() {
        let outcome = upgrade_document(legacy_doc(), T0).unwrap();
        assert!(outcome.migrated);
        let state = outcome.state;

        let sweet = &state.planets[&PlanetId::Sweet];
        assert_eq!(sweet.candy, 1234.5);
        assert_eq!(sweet.total_candy_earned, 98765.0);
        assert_eq!(sweet.click_power, 6.0);
        assert_eq!(sweet.production_per_second, 12.0);
        assert_eq!(sweet.total_clicks, 321);
        assert_eq!(sweet.upgrades["sugar_spoon"], 5);
        assert!(sweet.unlocked);

        assert_eq!(state.planets.len(), 6);
        for id in &PlanetId::ALL[1..] {
            let planet = &state.planets[id];
            assert!(!planet.unlocked, "{id} should start locked");
            assert_eq!(planet.unlock_requirement, id.unlock_requirement());
        }

        assert!(state.is_multi_planet);
        assert_eq!(state.legacy.game_version, 2);
        assert_eq!(state.legacy.total_candy_earned, 98765.0);
        assert_eq!(state.legacy.prestige_level, 1);
        assert_eq!(state.legacy.start_time, 1000);
        assert!(state.legacy.achievements["first_click"].unlocked);
    }

    #[test]
    fn test_migration_does_not_unlock_planets() {
        // Lifetime earnings above every threshold still leave planets locked.
        let doc = json!({"totalCandyEarned": 10_000_000.0});
        let state = upgrade_document(doc, T0).unwrap().state;
        assert_eq!(state.planets.values().filter(|p| p.unlocked).count(), 1);
    }

    #[test]
    fn test_upgrading_enhanced_document_is_noop() {
        let first = upgrade_document(legacy_doc(), T0).unwrap().state;
        let doc = serde_json::to_value(&first).unwrap();

        let second = upgrade_document(doc.clone(), T0 + 60_000).unwrap();
        assert!(!second.migrated);
        assert_eq!(second.state, first);
        assert_eq!(serde_json::to_value(&second.state).unwrap(), doc);
    }

    #[test]
    fn test_is_multi_planet() {
        assert!(is_multi_planet(&json!({"isMultiPlanet": true})));
        assert!(is_multi_planet(&json!({"gameVersion": 2})));
        assert!(!is_multi_planet(&json!({"gameVersion": 1})));
        assert!(!is_multi_planet(&json!({"isMultiPlanet": "yes"})));
        assert!(!is_multi_planet(&json!({})));
    }

    #[test]
    fn test_fill_defaults_repairs_partial_document() {
        let doc = json!({
            "isMultiPlanet": true,
            "gameVersion": 2,
            "currentPlanet": "spicy",
            "planets": {
                "sweet": {"candy": 50.0, "unlocked": false},
                "spicy": {"unlocked": false, "specialMechanics": {"type": "sour", "ph": 3.0}},
                "cold": {"unlocked": true, "lastUpdate": 5}
            }
        });

        let state = upgrade_document(doc, T0).unwrap().state;

        assert_eq!(state.planets.len(), 6);
        let sweet = &state.planets[&PlanetId::Sweet];
        assert!(sweet.unlocked);
        assert_eq!(sweet.candy, 50.0);
        assert_eq!(sweet.last_update, T0);

        let spicy = &state.planets[&PlanetId::Spicy];
        assert_eq!(spicy.id, PlanetId::Spicy);
        assert_eq!(spicy.special_mechanics.planet(), PlanetId::Spicy);
        assert_eq!(spicy.name, "Spicy Planet");

        let cold = &state.planets[&PlanetId::Cold];
        assert!(cold.unlocked);
        assert_eq!(cold.last_update, 5);
        assert_eq!(cold.special_mechanics.planet(), PlanetId::Cold);

        // Spicy is locked, so the player is sent home.
        assert_eq!(state.current_planet, PlanetId::Sweet);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            upgrade_document(json!([1, 2, 3]), T0),
            Err(MigrationError::NotAnObject("array"))
        ));
        assert!(matches!(
            upgrade_document(json!("save"), T0),
            Err(MigrationError::NotAnObject("string"))
        ));
        assert!(matches!(
            upgrade_document(json!({"candy": "lots"}), T0),
            Err(MigrationError::Malformed(_))
        ));
        assert!(matches!(
            upgrade_document(json!({"isMultiPlanet": true, "planets": {"pluto": {}}}), T0),
            Err(MigrationError::Malformed(_))
        ));
    }
}
