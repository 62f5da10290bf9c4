// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Authentication routes, all forwarded to the authentication service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::response::Response;

use crate::error::Result;
use crate::state::SharedState;

/// `POST /auth/login`
pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    state
        .proxy
        .forward(Method::POST, "auth/login", &headers, body)
        .await
}

/// `POST /auth/logout`
pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    state
        .proxy
        .forward(Method::POST, "auth/logout", &headers, body)
        .await
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    state
        .proxy
        .forward(Method::POST, "auth/register", &headers, body)
        .await
}

/// `GET /auth/validate`
pub async fn validate(State(state): State<SharedState>, headers: HeaderMap) -> Result<Response> {
    state
        .proxy
        .forward(Method::GET, "auth/validate", &headers, Bytes::new())
        .await
}
