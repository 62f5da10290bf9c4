// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SQLite-backed persistence implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ServerError;

use super::{GameStateRecord, MessageRecord, Persistence, UserAchievementRecord};

/// SQLite-backed persistence provider.
#[derive(Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Create a new SQLite persistence provider from an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a `sqlite:` URL, then run all migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ServerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        crate::migrations::run_sqlite(&pool).await?;
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// The pool holds a single connection, because every SQLite in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, ServerError> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Persistence for SqlitePersistence {
    async fn get_game_state(&self, user_id: Uuid) -> Result<Option<GameStateRecord>, ServerError> {
        let record = sqlx::query_as::<_, GameStateRecord>(
            r#"
            SELECT id, user_id, game_data, last_saved, created_at, updated_at
            FROM game_states
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_game_state(
        &self,
        user_id: Uuid,
        game_data: &Value,
        saved_at: DateTime<Utc>,
    ) -> Result<GameStateRecord, ServerError> {
        let record = sqlx::query_as::<_, GameStateRecord>(
            r#"
            INSERT INTO game_states (id, user_id, game_data, last_saved, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4, ?4)
            ON CONFLICT (user_id) DO UPDATE
            SET game_data = excluded.game_data,
                last_saved = excluded.last_saved,
                updated_at = excluded.updated_at
            RETURNING id, user_id, game_data, last_saved, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(game_data))
        .bind(saved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_user_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserAchievementRecord>, ServerError> {
        let records = sqlx::query_as::<_, UserAchievementRecord>(
            r#"
            SELECT id, user_id, achievement_id, unlocked_at, metadata
            FROM user_achievements
            WHERE user_id = ?
            ORDER BY unlocked_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        metadata: Option<&Value>,
        unlocked_at: DateTime<Utc>,
    ) -> Result<(UserAchievementRecord, bool), ServerError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_achievements (id, user_id, achievement_id, unlocked_at, metadata)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(achievement_id)
        .bind(unlocked_at)
        .bind(metadata.map(Json))
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;

        let record = sqlx::query_as::<_, UserAchievementRecord>(
            r#"
            SELECT id, user_id, achievement_id, unlocked_at, metadata
            FROM user_achievements
            WHERE user_id = ? AND achievement_id = ?
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((record, inserted))
    }

    async fn list_messages(&self) -> Result<Vec<MessageRecord>, ServerError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, content, author, "createdAt"
            FROM messages
            ORDER BY "createdAt" DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn insert_message(
        &self,
        content: &str,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<MessageRecord, ServerError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (content, author, "createdAt")
            VALUES (?, ?, ?)
            RETURNING id, content, author, "createdAt"
            "#,
        )
        .bind(content)
        .bind(author)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn health_check_db(&self) -> Result<bool, ServerError> {
        let row: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
