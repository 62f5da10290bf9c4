// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::env;
use std::net::SocketAddr;

/// Candy server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL or SQLite connection URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// HS256 secret shared with the authentication service
    pub jwt_secret: String,
    /// Base URL of the authentication service
    pub auth_url: String,
    /// Mount point of the API routes, without leading or trailing slashes
    pub api_prefix: String,
    /// HTTP listen port
    pub port: u16,
    /// Deployment environment name, reported by `/health`
    pub environment: String,
    /// Domain written into proxied `Set-Cookie` headers
    pub cookie_domain: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `JWT_SECRET`: secret used to verify bearer tokens
    ///
    /// Optional (with defaults):
    /// - `DATABASE_URL`: full connection string, overrides the `DB_*` variables
    /// - `DB_HOST` (localhost), `DB_PORT` (5432), `DB_USER` (postgres),
    ///   `DB_PASSWORD` (empty), `DB_NAME` (cosmic_candy)
    /// - `DB_MAX_CONNECTIONS`: pool size (default: 10)
    /// - `AUTH_URL`: authentication service (default: http://localhost:3001)
    /// - `API_PREFIX`: route prefix (default: api/app1)
    /// - `PORT`: listen port (default: 3000)
    /// - `NODE_ENV`: environment name (default: development)
    /// - `COOKIE_DOMAIN`: cookie domain rewrite for proxied auth responses
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = match non_empty("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts()?,
        };

        let db_max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid(
                "DB_MAX_CONNECTIONS",
                "must be a positive integer",
            ))?;

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let auth_url = non_empty("AUTH_URL")
            .unwrap_or_else(|| "http://localhost:3001".to_string())
            .trim_end_matches('/')
            .to_string();

        let api_prefix = env::var("API_PREFIX")
            .unwrap_or_else(|_| "api/app1".to_string())
            .trim_matches('/')
            .to_string();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT", "must be a valid port number"))?;

        let environment = non_empty("NODE_ENV").unwrap_or_else(|| "development".to_string());
        let cookie_domain = non_empty("COOKIE_DOMAIN");

        Ok(Self {
            database_url,
            db_max_connections,
            jwt_secret,
            auth_url,
            api_prefix,
            port,
            environment,
            cookie_domain,
        })
    }

    /// Address the HTTP server binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Whether the database URL points at SQLite.
    pub fn uses_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn database_url_from_parts() -> Result<String, ConfigError> {
    let host = non_empty("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = env::var("DB_PORT")
        .unwrap_or_else(|_| "5432".to_string())
        .parse()
        .map_err(|_| ConfigError::Invalid("DB_PORT", "must be a valid port number"))?;
    let user = non_empty("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = non_empty("DB_NAME").unwrap_or_else(|| "cosmic_candy".to_string());

    let credentials = if password.is_empty() {
        urlencoding::encode(&user).into_owned()
    } else {
        format!(
            "{}:{}",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        )
    };
    Ok(format!("postgres://{credentials}@{host}:{port}/{name}"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
