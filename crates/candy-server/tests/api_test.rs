// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API tests against an in-memory SQLite database.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use candy_core::achievements::ACHIEVEMENTS;
use serde_json::json;

use common::{TestContext, api};

#[tokio::test]
async fn test_game_routes_require_auth() {
    let ctx = TestContext::new().await;

    let res = ctx
        .call_with_token(Method::GET, &api("/game/state"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["statusCode"], 401);
    assert_eq!(res.body["error"], "Unauthorized");

    let res = ctx
        .call_with_token(Method::GET, &api("/game/state"), None, Some("not.a.jwt"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_cookie_is_accepted() {
    let ctx = TestContext::new().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri(api("/game/achievements"))
        .header(header::COOKIE, format!("theme=dark; auth_token={}", ctx.token))
        .body(Body::empty())
        .unwrap();

    let res = ctx.send(request).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_save_and_load_game_state() {
    let ctx = TestContext::new().await;

    let res = ctx.call(Method::GET, &api("/game/state"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "No saved game found");

    let doc = json!({"candy": 42.0, "totalCandyEarned": 100.0, "startTime": 1000});
    let res = ctx
        .call(Method::PUT, &api("/game/state"), Some(json!({"gameData": doc})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["userId"], ctx.user_id.to_string());
    assert_eq!(res.body["gameData"], doc);

    let res = ctx.call(Method::GET, &api("/game/state"), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["gameData"], doc);
    assert!(res.body["lastSaved"].is_string());
}

#[tokio::test]
async fn test_saves_are_per_user() {
    let ctx = TestContext::new().await;
    let other = common::token_for(uuid::Uuid::new_v4());

    ctx.call(
        Method::PUT,
        &api("/game/state"),
        Some(json!({"gameData": {"candy": 1}})),
    )
    .await;

    let res = ctx
        .call_with_token(Method::GET, &api("/game/state"), None, Some(&other))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_validation() {
    let ctx = TestContext::new().await;

    let res = ctx
        .call(
            Method::PUT,
            &api("/game/state"),
            Some(json!({"gameData": {}, "userId": "someone-else"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["statusCode"], 400);

    let res = ctx
        .call(Method::PUT, &api("/game/state"), Some(json!({"gameData": 5})))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "gameData must be an object");

    let res = ctx.call(Method::PUT, &api("/game/state"), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sync_without_stored_copy_stores_client() {
    let ctx = TestContext::new().await;
    let doc = json!({"totalCandyEarned": 10.0, "startTime": 1});

    let res = ctx
        .call(Method::POST, &api("/game/sync"), Some(json!({"gameData": doc})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["conflictResolved"], false);
    assert_eq!(res.body["gameData"], doc);

    let res = ctx.call(Method::GET, &api("/game/state"), None).await;
    assert_eq!(res.body["gameData"], doc);
}

#[tokio::test]
async fn test_sync_higher_total_wins() {
    let ctx = TestContext::new().await;
    let stored = json!({"totalCandyEarned": 500.0, "marker": "server"});
    ctx.call(Method::PUT, &api("/game/state"), Some(json!({"gameData": stored})))
        .await;

    // Client behind: the stored copy comes back.
    let behind = json!({"totalCandyEarned": 100.0, "marker": "client"});
    let res = ctx
        .call(Method::POST, &api("/game/sync"), Some(json!({"gameData": behind})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["conflictResolved"], true);
    assert_eq!(res.body["gameData"], stored);

    // Client ahead: the client copy is stored.
    let ahead = json!({"totalCandyEarned": 900.0, "marker": "client"});
    let res = ctx
        .call(Method::POST, &api("/game/sync"), Some(json!({"gameData": ahead})))
        .await;
    assert_eq!(res.body["conflictResolved"], false);
    assert_eq!(res.body["gameData"], ahead);

    let res = ctx.call(Method::GET, &api("/game/state"), None).await;
    assert_eq!(res.body["gameData"], ahead);
}

#[tokio::test]
async fn test_sync_tie_prefers_copy_saved_after_client_start() {
    let ctx = TestContext::new().await;
    let stored = json!({"totalCandyEarned": 100.0, "marker": "server"});
    ctx.call(Method::PUT, &api("/game/state"), Some(json!({"gameData": stored})))
        .await;

    // Client game started long before the stored save.
    let old_client = json!({"totalCandyEarned": 100.0, "startTime": 1, "marker": "client"});
    let res = ctx
        .call(
            Method::POST,
            &api("/game/sync"),
            Some(json!({"gameData": old_client})),
        )
        .await;
    assert_eq!(res.body["conflictResolved"], true);
    assert_eq!(res.body["gameData"], stored);

    // Client game started after the stored save.
    let far_future = chrono::Utc::now().timestamp_millis() + 3_600_000;
    let new_client = json!({"totalCandyEarned": 100.0, "startTime": far_future, "marker": "client"});
    let res = ctx
        .call(
            Method::POST,
            &api("/game/sync"),
            Some(json!({"gameData": new_client})),
        )
        .await;
    assert_eq!(res.body["conflictResolved"], false);
    assert_eq!(res.body["gameData"], new_client);
}

#[tokio::test]
async fn test_achievements_unlock_flow() {
    let ctx = TestContext::new().await;

    let res = ctx.call(Method::GET, &api("/game/achievements"), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let list = res.body.as_array().unwrap();
    assert_eq!(list.len(), ACHIEVEMENTS.len());
    assert!(list.iter().all(|a| a["unlocked"] == false));

    let res = ctx
        .call(
            Method::POST,
            &api("/game/achievements/first_click"),
            Some(json!({"metadata": {"clicks": 1}})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["newlyUnlocked"], true);
    assert_eq!(res.body["achievement"]["unlocked"], true);
    assert_eq!(res.body["achievement"]["metadata"], json!({"clicks": 1}));

    // Second unlock keeps the first record.
    let res = ctx
        .call(Method::POST, &api("/game/achievements/first_click"), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["newlyUnlocked"], false);
    assert_eq!(res.body["achievement"]["metadata"], json!({"clicks": 1}));

    let res = ctx.call(Method::GET, &api("/game/achievements"), None).await;
    let unlocked: Vec<_> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["unlocked"] == true)
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(unlocked, vec!["first_click".to_string()]);
}

#[tokio::test]
async fn test_unknown_achievement_and_bad_body() {
    let ctx = TestContext::new().await;

    let res = ctx
        .call(Method::POST, &api("/game/achievements/moon_landing"), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Achievement 'moon_landing' not found");

    let res = ctx
        .call(
            Method::POST,
            &api("/game/achievements/first_click"),
            Some(json!({"unexpected": true})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_message_board() {
    let ctx = TestContext::new().await;

    let res = ctx
        .call_with_token(
            Method::POST,
            &api("/messages"),
            Some(json!({"content": "  first!  "})),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["content"], "first!");
    assert_eq!(res.body["author"], "Anonymous");
    assert!(res.body["createdAt"].is_string());

    ctx.call_with_token(
        Method::POST,
        &api("/messages"),
        Some(json!({"content": "second", "author": "ada"})),
        None,
    )
    .await;

    let res = ctx
        .call_with_token(Method::GET, &api("/messages"), None, None)
        .await;
    let messages = res.body.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "second");

    let res = ctx
        .call_with_token(
            Method::POST,
            &api("/messages"),
            Some(json!({"content": ""})),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_is_unprefixed() {
    let ctx = TestContext::new().await;

    let res = ctx
        .call_with_token(Method::GET, "/health", None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["database"], "connected");
    assert_eq!(res.body["environment"], "test");
    assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
    assert!(res.body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(res.body["memory"]["systemTotal"].is_u64());

    let res = ctx
        .call_with_token(Method::GET, &api("/health"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
