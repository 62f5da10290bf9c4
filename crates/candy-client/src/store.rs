// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Game persistence with guest fallback.
//!
//! A player with a token is backed by the server; everyone else plays as a
//! guest against local storage. Credential problems never surface as errors:
//! a 401 or 403 from the server quietly switches to the local copy.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{GameApiClient, SyncResult};
use crate::error::{ClientError, StoreError};
use crate::storage::{LocalStorage, MIGRATED_KEY, SAVE_KEY, TOKEN_KEY};

/// What a sync did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// No server or no valid credentials; only the local copy was written.
    Guest,
    /// The server answered.
    Synced(SyncResult),
}

/// Loads and stores the game document.
#[derive(Clone)]
pub struct GameStore {
    api: Option<GameApiClient>,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for GameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStore")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl GameStore {
    /// Store backed by the server when `api` is given.
    pub fn new(api: Option<GameApiClient>, storage: Arc<dyn LocalStorage>) -> Self {
        Self { api, storage }
    }

    /// Store that never talks to a server.
    pub fn guest(storage: Arc<dyn LocalStorage>) -> Self {
        Self::new(None, storage)
    }

    /// The local key/value store.
    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.storage
    }

    /// The saved token, if any.
    pub async fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    /// Remember a token for later requests.
    pub async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.storage
            .set(TOKEN_KEY, token)
            .await
            .map_err(|e| StoreError::Save(e.into()))
    }

    /// Forget the token.
    pub async fn clear_token(&self) -> Result<(), StoreError> {
        self.storage
            .remove(TOKEN_KEY)
            .await
            .map_err(|e| StoreError::Save(e.into()))
    }

    async fn credentials(&self) -> Option<(&GameApiClient, String)> {
        let api = self.api.as_ref()?;
        let token = self.token().await?;
        Some((api, token))
    }

    /// Load the game document.
    ///
    /// Signed-in players get the server copy, falling back to the local copy
    /// when the server has none. Guests and rejected credentials get the local
    /// copy.
    pub async fn load(&self) -> Result<Option<Value>, StoreError> {
        if let Some((api, token)) = self.credentials().await {
            match api.load_game_state(&token).await {
                Ok(Some(remote)) => {
                    debug!(last_saved = %remote.last_saved, "Loaded game from server");
                    return Ok(Some(remote.game_data));
                }
                Ok(None) => debug!("Server has no save, using local copy"),
                Err(ClientError::Unauthorized) => {
                    debug!("Credentials rejected, playing as guest");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load game state");
                    return Err(StoreError::Load(e));
                }
            }
        }
        self.load_local().await
    }

    /// Load the local copy only.
    pub async fn load_local(&self) -> Result<Option<Value>, StoreError> {
        let raw = self
            .storage
            .get(SAVE_KEY)
            .await
            .map_err(|e| StoreError::Load(e.into()))?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| {
                    warn!(error = %e, "Local save is not valid JSON");
                    StoreError::Load(e.into())
                }),
            None => Ok(None),
        }
    }

    /// Write the local copy.
    pub async fn save_local(&self, doc: &Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(doc).map_err(|e| StoreError::Save(e.into()))?;
        self.storage.set(SAVE_KEY, &raw).await.map_err(|e| {
            warn!(error = %e, "Failed to save game state locally");
            StoreError::Save(e.into())
        })
    }

    /// Upsert the server copy without conflict checks, then the local copy.
    pub async fn save(&self, doc: &Value) -> Result<(), StoreError> {
        self.save_local(doc).await?;
        if let Some((api, token)) = self.credentials().await {
            match api.save_game_state(&token, doc).await {
                Ok(last_saved) => debug!(%last_saved, "Saved game to server"),
                Err(ClientError::Unauthorized) => debug!("Credentials rejected, saved locally"),
                Err(e) => {
                    warn!(error = %e, "Failed to save game state");
                    return Err(StoreError::Save(e));
                }
            }
        }
        Ok(())
    }

    /// Push the document through the server's conflict policy.
    ///
    /// The local copy is always written first. When the server's copy wins it
    /// replaces the local copy too.
    pub async fn sync(&self, doc: &Value) -> Result<SyncOutcome, StoreError> {
        self.save_local(doc).await?;
        let Some((api, token)) = self.credentials().await else {
            return Ok(SyncOutcome::Guest);
        };

        match api.sync_game_state(&token, doc).await {
            Ok(result) => {
                if result.conflict_resolved {
                    info!("Server copy is ahead, replacing local game");
                    self.save_local(&result.game_data).await?;
                }
                Ok(SyncOutcome::Synced(result))
            }
            Err(ClientError::Unauthorized) => {
                debug!("Credentials rejected, sync skipped");
                Ok(SyncOutcome::Guest)
            }
            Err(e) => {
                warn!(error = %e, "Failed to sync game state");
                Err(StoreError::Sync(e))
            }
        }
    }

    /// Whether a single-planet save has been upgraded on this device.
    pub async fn is_migrated(&self) -> bool {
        matches!(self.storage.get(MIGRATED_KEY).await, Ok(Some(v)) if v == "true")
    }

    /// Record that the save has been upgraded.
    pub async fn mark_migrated(&self) -> Result<(), StoreError> {
        self.storage
            .set(MIGRATED_KEY, "true")
            .await
            .map_err(|e| StoreError::Save(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn guest_store() -> GameStore {
        GameStore::guest(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_guest_round_trip() {
        let store = guest_store();
        assert_eq!(store.load().await.unwrap(), None);

        let doc = json!({"candy": 3.0});
        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(doc.clone()));

        assert_eq!(store.sync(&doc).await.unwrap(), SyncOutcome::Guest);
    }

    #[tokio::test]
    async fn test_corrupt_local_save() {
        let store = guest_store();
        store.storage().set(SAVE_KEY, "{not json").await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Load(ClientError::Serialization(_))));
        assert_eq!(err.to_string(), "Failed to load game state");
    }

    #[tokio::test]
    async fn test_token_and_migration_flag() {
        let store = guest_store();
        assert_eq!(store.token().await, None);
        store.set_token("abc").await.unwrap();
        assert_eq!(store.token().await.as_deref(), Some("abc"));
        store.clear_token().await.unwrap();
        assert_eq!(store.token().await, None);

        assert!(!store.is_migrated().await);
        store.mark_migrated().await.unwrap();
        assert!(store.is_migrated().await);
    }
}
