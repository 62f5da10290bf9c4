// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for candy-core.
//!
//! Game actions never perform I/O, so every error here is a rejected player
//! action. A rejected action leaves the state untouched.

use crate::planet::PlanetId;

/// Result type using GameError
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors returned when a player action cannot be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GameError {
    /// The upgrade id is not in the catalog of the targeted planet.
    #[error("Unknown upgrade '{0}'")]
    UnknownUpgrade(String),

    /// The upgrade exists but is not visible in the shop yet.
    #[error("Upgrade '{0}' is not unlocked yet")]
    UpgradeLocked(String),

    /// The player cannot afford the action.
    #[error("Not enough candy: need {needed}, have {available}")]
    InsufficientCandy {
        /// Candy required by the action.
        needed: f64,
        /// Candy currently banked.
        available: f64,
    },

    /// The planet has not been unlocked.
    #[error("Planet '{0}' is locked")]
    PlanetLocked(PlanetId),

    /// The planet is already unlocked.
    #[error("Planet '{0}' is already unlocked")]
    PlanetAlreadyUnlocked(PlanetId),

    /// Lifetime earnings are below the planet's unlock threshold.
    #[error("Planet '{planet}' requires {required} total candy earned")]
    UnlockRequirementNotMet {
        /// The planet the player tried to unlock.
        planet: PlanetId,
        /// Lifetime earnings required.
        required: f64,
    },

    /// The planet's mechanic does not support the action.
    #[error("Planet '{0}' does not support this action")]
    MechanicUnavailable(PlanetId),

    /// The planet id could not be parsed.
    #[error("Unknown planet '{0}'")]
    UnknownPlanet(String),

    /// The cross-planet recipe id is not in the catalog.
    #[error("Unknown recipe '{0}'")]
    UnknownRecipe(String),

    /// No trade route exists with this id.
    #[error("Unknown trade route '{0}'")]
    UnknownTradeRoute(String),

    /// A trade route cannot be established between the given planets.
    #[error("Invalid trade route: {0}")]
    InvalidTradeRoute(String),

    /// Not enough candy earned since the last prestige.
    #[error("Prestige requires {required} candy earned this run")]
    PrestigeUnavailable {
        /// Candy that must be earned during the current run.
        required: f64,
    },

    /// A numeric argument was not finite.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// The argument name.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl GameError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUpgrade(_) => "UNKNOWN_UPGRADE",
            Self::UpgradeLocked(_) => "UPGRADE_LOCKED",
            Self::InsufficientCandy { .. } => "INSUFFICIENT_CANDY",
            Self::PlanetLocked(_) => "PLANET_LOCKED",
            Self::PlanetAlreadyUnlocked(_) => "PLANET_ALREADY_UNLOCKED",
            Self::UnlockRequirementNotMet { .. } => "UNLOCK_REQUIREMENT_NOT_MET",
            Self::MechanicUnavailable(_) => "MECHANIC_UNAVAILABLE",
            Self::UnknownPlanet(_) => "UNKNOWN_PLANET",
            Self::UnknownRecipe(_) => "UNKNOWN_RECIPE",
            Self::UnknownTradeRoute(_) => "UNKNOWN_TRADE_ROUTE",
            Self::InvalidTradeRoute(_) => "INVALID_TRADE_ROUTE",
            Self::PrestigeUnavailable { .. } => "PRESTIGE_UNAVAILABLE",
            Self::InvalidValue { .. } => "INVALID_VALUE",
        }
    }
}

/// Reject NaN and infinite player inputs.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GameError::InvalidValue {
            field,
            message: format!("expected a finite number, got {}", value),
        })
    }
}
