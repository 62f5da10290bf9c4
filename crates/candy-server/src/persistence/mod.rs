// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for candy-server.
//!
//! This module defines the persistence abstraction and backend implementations.

pub mod postgres;
pub mod sqlite;

pub use self::postgres::PostgresPersistence;
pub use self::sqlite::SqlitePersistence;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ServerError;

/// Stored game document for one user.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Owner of the save.
    pub user_id: Uuid,
    /// The game document exactly as the client sent it.
    pub game_data: Json<Value>,
    /// When the document was last written.
    pub last_saved: DateTime<Utc>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Server-side achievement unlock.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievementRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Owner of the unlock.
    pub user_id: Uuid,
    /// Catalog id of the achievement.
    pub achievement_id: String,
    /// When it was unlocked.
    pub unlocked_at: DateTime<Utc>,
    /// Free-form client data recorded with the unlock.
    pub metadata: Option<Json<Value>>,
}

/// Message board entry.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Sequential identifier.
    pub id: i32,
    /// Message text.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// When the message was posted.
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Persistence interface used by the HTTP handlers.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Load a user's save, if any.
    async fn get_game_state(&self, user_id: Uuid) -> Result<Option<GameStateRecord>, ServerError>;

    /// Insert or replace a user's save in a single statement.
    async fn upsert_game_state(
        &self,
        user_id: Uuid,
        game_data: &Value,
        saved_at: DateTime<Utc>,
    ) -> Result<GameStateRecord, ServerError>;

    /// All achievements a user has unlocked, oldest first.
    async fn list_user_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserAchievementRecord>, ServerError>;

    /// Record an unlock. Unlocking twice keeps the first record.
    ///
    /// Returns the stored record and whether this call created it.
    async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        metadata: Option<&Value>,
        unlocked_at: DateTime<Utc>,
    ) -> Result<(UserAchievementRecord, bool), ServerError>;

    /// All messages, newest first.
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, ServerError>;

    /// Post a message.
    async fn insert_message(
        &self,
        content: &str,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<MessageRecord, ServerError>;

    /// Whether the database answers a trivial query.
    async fn health_check_db(&self) -> Result<bool, ServerError>;
}
