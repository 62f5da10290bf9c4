// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL persistence tests.
//!
//! These run only when `TEST_DATABASE_URL` points at a PostgreSQL database.

use candy_server::persistence::{Persistence, PostgresPersistence};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

/// Skip test if database URL is not set
macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn persistence() -> PostgresPersistence {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL");
    PostgresPersistence::connect(&url, 2)
        .await
        .expect("Failed to connect to test database")
}

#[tokio::test]
async fn test_pg_upsert_game_state() {
    skip_if_no_db!();
    let db = persistence().await;
    let user = Uuid::new_v4();
    let t0 = Utc::now();

    let first = db
        .upsert_game_state(user, &json!({"candy": 1}), t0)
        .await
        .unwrap();
    let second = db
        .upsert_game_state(user, &json!({"candy": 2}), t0 + Duration::seconds(1))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.game_data.0, json!({"candy": 2}));
    assert_eq!(
        db.get_game_state(user).await.unwrap().unwrap().game_data.0,
        json!({"candy": 2})
    );
}

#[tokio::test]
async fn test_pg_unlock_achievement_idempotent() {
    skip_if_no_db!();
    let db = persistence().await;
    let user = Uuid::new_v4();

    let (_, created) = db
        .unlock_achievement(user, "sweet_tooth", None, Utc::now())
        .await
        .unwrap();
    assert!(created);
    let (_, created) = db
        .unlock_achievement(user, "sweet_tooth", None, Utc::now())
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(db.list_user_achievements(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pg_messages_and_health() {
    skip_if_no_db!();
    let db = persistence().await;
    let content = format!("hello {}", Uuid::new_v4());

    let record = db.insert_message(&content, "tester", Utc::now()).await.unwrap();
    assert!(record.id > 0);
    assert!(db.list_messages().await.unwrap().iter().any(|m| m.content == content));
    assert!(db.health_check_db().await.unwrap());
}
