// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP client for the candy server's game routes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// A save loaded from the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGame {
    /// The stored document.
    pub game_data: Value,
    /// When the server stored it.
    pub last_saved: DateTime<Utc>,
}

/// Result of a sync.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// The document that won.
    pub game_data: Value,
    /// True when the server's copy won and must replace the local game.
    pub conflict_resolved: bool,
    /// When the winning copy was stored.
    pub last_saved: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedRecord {
    last_saved: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameDataBody<'a> {
    game_data: &'a Value,
}

/// Client for `/game/*`.
#[derive(Debug, Clone)]
pub struct GameApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GameApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base(),
        })
    }

    /// Base URL of the API routes.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /game/state`. `None` when the user has no save.
    pub async fn load_game_state(&self, token: &str) -> Result<Option<RemoteGame>> {
        let response = self
            .http
            .get(self.url("/game/state"))
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No saved game on server");
            return Ok(None);
        }
        let response = check(response).await?;
        Ok(Some(response.json().await?))
    }

    /// `PUT /game/state`. Returns the server's save time.
    pub async fn save_game_state(&self, token: &str, game_data: &Value) -> Result<DateTime<Utc>> {
        let response = self
            .http
            .put(self.url("/game/state"))
            .bearer_auth(token)
            .json(&GameDataBody { game_data })
            .send()
            .await?;
        let record: SavedRecord = check(response).await?.json().await?;
        Ok(record.last_saved)
    }

    /// `POST /game/sync`.
    pub async fn sync_game_state(&self, token: &str, game_data: &Value) -> Result<SyncResult> {
        let response = self
            .http
            .post(self.url("/game/sync"))
            .bearer_auth(token)
            .json(&GameDataBody { game_data })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Map error statuses to [`ClientError`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
