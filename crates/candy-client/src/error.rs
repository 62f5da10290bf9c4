// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client error types.

use candy_core::MigrationError;
use thiserror::Error;

/// Errors from the API client and local storage.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (missing or invalid environment variable)
    #[error("configuration error: {0}")]
    Config(String),

    /// The server rejected the credentials (401 or 403)
    #[error("not authenticated")]
    Unauthorized,

    /// Request could not be sent or the response could not be read
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("server error: {status} - {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage read or write failed
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Stored game could not be loaded by the game model
    #[error("invalid game document: {0}")]
    Document(#[from] MigrationError),
}

/// Result type using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by [`GameStore`](crate::store::GameStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Loading failed for a reason other than missing credentials.
    #[error("Failed to load game state")]
    Load(#[source] ClientError),

    /// Saving failed.
    #[error("Failed to save game state")]
    Save(#[source] ClientError),

    /// Syncing with the server failed.
    #[error("Failed to sync game state")]
    Sync(#[source] ClientError),
}

impl StoreError {
    /// The underlying client error.
    pub fn cause(&self) -> &ClientError {
        match self {
            StoreError::Load(e) | StoreError::Save(e) | StoreError::Sync(e) => e,
        }
    }
}
