// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL-backed persistence implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::ServerError;

use super::{GameStateRecord, MessageRecord, Persistence, UserAchievementRecord};

/// PostgreSQL-backed persistence provider.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Create a new Postgres-backed persistence implementation.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then run all migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ServerError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        crate::migrations::run_postgres(&pool).await?;
        Ok(Self { pool })
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Persistence for PostgresPersistence {
    async fn get_game_state(&self, user_id: Uuid) -> Result<Option<GameStateRecord>, ServerError> {
        let record = sqlx::query_as::<_, GameStateRecord>(
            r#"
            SELECT id, user_id, game_data, last_saved, created_at, updated_at
            FROM game_states
            WHERE user_id = $1
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
            VALUES ($1, $2, $3, $4, $4, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET game_data = EXCLUDED.game_data,
                last_saved = EXCLUDED.last_saved,
                updated_at = EXCLUDED.updated_at
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
            WHERE user_id = $1
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
            VALUES ($1, $2, $3, $4, $5)
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
            WHERE user_id = $1 AND achievement_id = $2
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
            VALUES ($1, $2, $3)
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
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
