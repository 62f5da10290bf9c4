// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Game state load, save and sync.

use axum::Json;
use axum::extract::State;
use candy_core::migration::upgrade_document;
use candy_core::{SyncWinner, resolve_conflict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::persistence::GameStateRecord;
use crate::state::SharedState;

use super::ApiJson;

/// Body of `PUT /game/state` and `POST /game/sync`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameDataRequest {
    /// The full game document.
    pub game_data: Value,
}

/// Answer of `GET /game/state`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    /// Stored document.
    pub game_data: Value,
    /// When it was stored.
    pub last_saved: DateTime<Utc>,
}

/// Answer of `POST /game/sync`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// The document that won.
    pub game_data: Value,
    /// True when the stored copy won and the client must adopt it.
    pub conflict_resolved: bool,
    /// When the winning copy was stored.
    pub last_saved: DateTime<Utc>,
}

/// Reject documents the game could never load.
pub fn validate_game_data(game_data: &Value) -> Result<()> {
    if !game_data.is_object() {
        return Err(ServerError::BadRequest(
            "gameData must be an object".to_string(),
        ));
    }
    if let Some(total) = game_data.get("totalCandyEarned")
        && total.as_f64().is_none_or(|t| t < 0.0)
    {
        return Err(ServerError::BadRequest(
            "gameData.totalCandyEarned must be a non-negative number".to_string(),
        ));
    }
    upgrade_document(game_data.clone(), Utc::now().timestamp_millis())
        .map_err(|e| ServerError::BadRequest(format!("gameData is not a valid save: {e}")))?;
    Ok(())
}

/// `GET /game/state`
pub async fn get_state(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GameStateResponse>> {
    let record = state
        .persistence
        .get_game_state(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("No saved game found".to_string()))?;

    Ok(Json(GameStateResponse {
        game_data: record.game_data.0,
        last_saved: record.last_saved,
    }))
}

/// `PUT /game/state`
pub async fn put_state(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<GameDataRequest>,
) -> Result<Json<GameStateRecord>> {
    validate_game_data(&body.game_data)?;
    let record = state
        .persistence
        .upsert_game_state(user_id, &body.game_data, Utc::now())
        .await?;
    debug!(%user_id, "Game state saved");
    Ok(Json(record))
}

/// `POST /game/sync`
///
/// With no stored copy the client's document is stored. Otherwise the
/// document with more lifetime earnings wins; the read and the write are
/// separate statements, so two concurrent syncs may both read the same row.
pub async fn sync(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<GameDataRequest>,
) -> Result<Json<SyncResponse>> {
    validate_game_data(&body.game_data)?;

    let stored = state.persistence.get_game_state(user_id).await?;
    let winner = match &stored {
        Some(record) => resolve_conflict(
            &body.game_data,
            &record.game_data.0,
            record.last_saved.timestamp_millis(),
        ),
        None => SyncWinner::Client,
    };

    let response = match (winner, stored) {
        (SyncWinner::Server, Some(record)) => {
            info!(%user_id, "Sync conflict resolved in favour of stored game");
            SyncResponse {
                game_data: record.game_data.0,
                conflict_resolved: true,
                last_saved: record.last_saved,
            }
        }
        _ => {
            let record = state
                .persistence
                .upsert_game_state(user_id, &body.game_data, Utc::now())
                .await?;
            debug!(%user_id, "Sync stored client game");
            SyncResponse {
                game_data: record.game_data.0,
                conflict_resolved: false,
                last_saved: record.last_saved,
            }
        }
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_game_data() {
        assert!(validate_game_data(&json!({"candy": 5, "totalCandyEarned": 5})).is_ok());
        assert!(validate_game_data(&json!({})).is_ok());
        assert!(matches!(
            validate_game_data(&json!([1])),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            validate_game_data(&json!({"totalCandyEarned": -1})),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            validate_game_data(&json!({"totalCandyEarned": "many"})),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            validate_game_data(&json!({"candy": "lots"})),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let parsed: std::result::Result<GameDataRequest, _> =
            serde_json::from_value(json!({"gameData": {}, "extra": 1}));
        assert!(parsed.is_err());
    }
}
