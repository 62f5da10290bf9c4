// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API client and store tests against a mock candy server.

use std::sync::Arc;

use candy_client::storage::{SAVE_KEY, TOKEN_KEY};
use candy_client::{
    ClientConfig, ClientError, GameApiClient, GameStore, LocalStorage, MemoryStorage, StoreError,
    SyncOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAST_SAVED: &str = "2025-03-01T12:00:00Z";

fn client(server: &MockServer) -> GameApiClient {
    GameApiClient::new(&ClientConfig::new(server.uri())).unwrap()
}

async fn signed_in_store(server: &MockServer) -> (GameStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(TOKEN_KEY, "tok").await.unwrap();
    let store = GameStore::new(Some(client(server)), storage.clone());
    (store, storage)
}

#[tokio::test]
async fn test_load_returns_none_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/app1/game/state"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": "No saved game found",
            "error": "Not Found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server).load_game_state("tok").await.unwrap(), None);
}

#[tokio::test]
async fn test_load_parses_saved_game() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/app1/game/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5b0c6f57-8a86-4d43-9d52-0d8ad1c3c1a4",
            "userId": "0e1f3c1e-7f7d-4f55-a0ea-6a1e0d58c6d1",
            "gameData": {"totalCandyEarned": 42.0},
            "lastSaved": LAST_SAVED,
        })))
        .mount(&server)
        .await;

    let remote = client(&server).load_game_state("tok").await.unwrap().unwrap();
    assert_eq!(remote.game_data, json!({"totalCandyEarned": 42.0}));
    assert_eq!(remote.last_saved.to_rfc3339(), "2025-03-01T12:00:00+00:00");
}

#[tokio::test]
async fn test_unauthorized_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/app1/game/state"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/app1/game/sync"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "message": "gameData must be an object",
            "error": "Bad Request"
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let err = api.save_game_state("tok", &json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    let err = api.sync_game_state("tok", &json!(1)).await.unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "gameData must be an object");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sync_sends_wrapped_document() {
    let server = MockServer::start().await;
    let doc = json!({"totalCandyEarned": 10.0});
    Mock::given(method("POST"))
        .and(path("/api/app1/game/sync"))
        .and(body_json(json!({"gameData": doc})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gameData": doc,
            "conflictResolved": false,
            "lastSaved": LAST_SAVED,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).sync_game_state("tok", &doc).await.unwrap();
    assert!(!result.conflict_resolved);
    assert_eq!(result.game_data, doc);
}

#[tokio::test]
async fn test_store_falls_back_to_local_when_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/app1/game/state"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (store, storage) = signed_in_store(&server).await;
    storage
        .set(SAVE_KEY, r#"{"totalCandyEarned":7.0}"#)
        .await
        .unwrap();

    let doc = store.load().await.unwrap();
    assert_eq!(doc, Some(json!({"totalCandyEarned": 7.0})));
}

#[tokio::test]
async fn test_store_surfaces_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/app1/game/state"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusCode": 500,
            "message": "Internal server error",
            "error": "Internal Server Error"
        })))
        .mount(&server)
        .await;

    let (store, _) = signed_in_store(&server).await;
    let err = store.load().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load game state");
    assert!(matches!(
        err.cause(),
        ClientError::Server { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_store_sync_adopts_server_copy() {
    let server = MockServer::start().await;
    let stored = json!({"totalCandyEarned": 900.0});
    Mock::given(method("POST"))
        .and(path("/api/app1/game/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gameData": stored,
            "conflictResolved": true,
            "lastSaved": LAST_SAVED,
        })))
        .mount(&server)
        .await;

    let (store, _) = signed_in_store(&server).await;
    let outcome = store.sync(&json!({"totalCandyEarned": 5.0})).await.unwrap();

    match outcome {
        SyncOutcome::Synced(result) => assert!(result.conflict_resolved),
        SyncOutcome::Guest => panic!("expected a server answer"),
    }
    assert_eq!(store.load_local().await.unwrap(), Some(stored));
}

#[tokio::test]
async fn test_store_sync_reports_network_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(format!("http://127.0.0.1:{port}")).with_request_timeout_ms(2_000);
    let storage = Arc::new(MemoryStorage::new());
    storage.set(TOKEN_KEY, "tok").await.unwrap();
    let store = GameStore::new(Some(GameApiClient::new(&config).unwrap()), storage);

    let err = store.sync(&json!({"totalCandyEarned": 1.0})).await.unwrap_err();
    assert!(matches!(err, StoreError::Sync(ClientError::Http(_))));
    // Local copy is written before the request.
    assert_eq!(
        store.load_local().await.unwrap(),
        Some(json!({"totalCandyEarned": 1.0}))
    );
}
