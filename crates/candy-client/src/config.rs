// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client configuration.

use std::env;
use std::path::PathBuf;

use crate::error::{ClientError, Result};

/// Client configuration for reaching the candy server.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server base URL (default: "http://localhost:3000")
    pub api_url: String,
    /// API route prefix (default: "api/app1")
    pub api_prefix: String,
    /// Directory for guest saves and the auth token (default: ".candy")
    pub data_dir: PathBuf,
    /// Request timeout in milliseconds (default: 10_000)
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `CANDY_API_URL` - Server base URL (default: "http://localhost:3000")
    /// - `CANDY_API_PREFIX` - API route prefix (default: "api/app1")
    /// - `CANDY_DATA_DIR` - Local data directory (default: ".candy")
    /// - `CANDY_REQUEST_TIMEOUT_MS` - Request timeout (default: 10000)
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("CANDY_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "invalid CANDY_API_URL: {api_url} (expected http:// or https://)"
            )));
        }

        let mut config = Self::new(api_url);

        if let Ok(prefix) = env::var("CANDY_API_PREFIX") {
            config = config.with_api_prefix(prefix);
        }
        if let Ok(dir) = env::var("CANDY_DATA_DIR") {
            config = config.with_data_dir(dir);
        }
        if let Ok(timeout) = env::var("CANDY_REQUEST_TIMEOUT_MS") {
            let timeout = timeout
                .parse()
                .map_err(|e| ClientError::Config(format!("invalid CANDY_REQUEST_TIMEOUT_MS: {}", e)))?;
            config = config.with_request_timeout_ms(timeout);
        }

        Ok(config)
    }

    /// Create a configuration for the given server with default settings.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_prefix: "api/app1".to_string(),
            data_dir: PathBuf::from(".candy"),
            request_timeout_ms: 10_000,
        }
    }

    /// Set the API route prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Set the local data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Base URL of the API routes.
    pub fn api_base(&self) -> String {
        if self.api_prefix.is_empty() {
            self.api_url.clone()
        } else {
            format!("{}/{}", self.api_url, self.api_prefix)
        }
    }
}
