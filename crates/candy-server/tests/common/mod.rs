// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for candy-server API tests.
//!
//! Builds the real router over an in-memory SQLite database and drives it with
//! `tower::ServiceExt::oneshot`, so no socket is opened.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use candy_server::auth::Claims;
use candy_server::config::Config;
use candy_server::persistence::SqlitePersistence;
use candy_server::server::build_router;
use candy_server::state::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const PREFIX: &str = "/api/app1";

/// Test context with a router and a signed token for one user.
pub struct TestContext {
    pub router: Router,
    pub user_id: Uuid,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_auth_url("http://127.0.0.1:9", None).await
    }

    pub async fn with_auth_url(auth_url: &str, cookie_domain: Option<&str>) -> Self {
        let persistence = SqlitePersistence::in_memory()
            .await
            .expect("Failed to create in-memory database");
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: SECRET.to_string(),
            auth_url: auth_url.to_string(),
            api_prefix: "api/app1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cookie_domain: cookie_domain.map(str::to_string),
        };
        let state = Arc::new(AppState::new(Arc::new(persistence), &config));
        let router = build_router(state, &config.api_prefix);

        let user_id = Uuid::new_v4();
        Self {
            router,
            user_id,
            token: token_for(user_id),
        }
    }

    /// Send a request as the context's user. `body` is sent as JSON when given.
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let token = self.token.clone();
        self.call_with_token(method, path, body, Some(&token)).await
    }

    pub async fn call_with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
        email: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn api(path: &str) -> String {
    format!("{PREFIX}{path}")
}
