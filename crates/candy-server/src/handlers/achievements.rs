// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Server-side achievement records.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use candy_core::achievements::{ACHIEVEMENTS, AchievementDefinition, find_achievement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::persistence::UserAchievementRecord;
use crate::state::SharedState;

/// One catalog entry joined with the user's unlock.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementView {
    /// Catalog id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Whether the user has unlocked it.
    pub unlocked: bool,
    /// When it was unlocked.
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Data recorded with the unlock.
    pub metadata: Option<Value>,
}

impl AchievementView {
    fn new(def: &AchievementDefinition, record: Option<&UserAchievementRecord>) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            unlocked: record.is_some(),
            unlocked_at: record.map(|r| r.unlocked_at),
            metadata: record.and_then(|r| r.metadata.as_ref()).map(|m| m.0.clone()),
        }
    }
}

/// Body of `POST /game/achievements/{id}`. An empty body is allowed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnlockAchievementRequest {
    /// Free-form data stored with the unlock.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Answer of `POST /game/achievements/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockAchievementResponse {
    /// The achievement after the call.
    pub achievement: AchievementView,
    /// False when it had already been unlocked.
    pub newly_unlocked: bool,
}

/// `GET /game/achievements`
pub async fn list(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<AchievementView>>> {
    let records = state.persistence.list_user_achievements(user_id).await?;
    let by_id: HashMap<&str, &UserAchievementRecord> = records
        .iter()
        .map(|r| (r.achievement_id.as_str(), r))
        .collect();

    let views = ACHIEVEMENTS
        .iter()
        .map(|def| AchievementView::new(def, by_id.get(def.id).copied()))
        .collect();
    Ok(Json(views))
}

/// `POST /game/achievements/{id}`
///
/// Unlocking is idempotent: a repeated call returns the original record with
/// `200 OK` instead of `201 Created`.
pub async fn unlock(
    State(state): State<SharedState>,
    AuthUser(user_id): AuthUser,
    Path(achievement_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<UnlockAchievementResponse>)> {
    let def = find_achievement(&achievement_id).ok_or_else(|| {
        ServerError::NotFound(format!("Achievement '{}' not found", achievement_id))
    })?;

    let request: UnlockAchievementRequest = if body.iter().all(u8::is_ascii_whitespace) {
        UnlockAchievementRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServerError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let (record, created) = state
        .persistence
        .unlock_achievement(user_id, def.id, request.metadata.as_ref(), Utc::now())
        .await?;
    if created {
        info!(%user_id, achievement = def.id, "Achievement unlocked");
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(UnlockAchievementResponse {
            achievement: AchievementView::new(def, Some(&record)),
            newly_unlocked: created,
        }),
    ))
}
