// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pass-through proxy to the external authentication service.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, Method};
use axum::response::Response;
use tracing::{debug, warn};

use crate::error::ServerError;

/// Request headers copied to the authentication service.
const FORWARDED_HEADERS: [HeaderName; 3] = [COOKIE, AUTHORIZATION, CONTENT_TYPE];

/// Rewrite the `Domain` attribute of a `Set-Cookie` value.
///
/// Any existing `Domain` attribute is dropped. When `domain` is given it is
/// appended instead, so cookies set by the authentication service land on the
/// game's domain.
pub fn rewrite_set_cookie(value: &str, domain: Option<&str>) -> String {
    let mut parts: Vec<String> = value
        .split(';')
        .map(str::trim)
        .enumerate()
        .filter(|(index, part)| {
            if part.is_empty() {
                return false;
            }
            let name = part.split_once('=').map_or(*part, |(name, _)| name);
            *index == 0 || !name.trim().eq_ignore_ascii_case("domain")
        })
        .map(|(_, part)| part.to_string())
        .collect();
    if let Some(domain) = domain {
        parts.push(format!("Domain={domain}"));
    }
    parts.join("; ")
}

/// Forwards auth requests and relays the answers.
#[derive(Debug, Clone)]
pub struct AuthProxy {
    client: reqwest::Client,
    base_url: String,
    cookie_domain: Option<String>,
}

impl AuthProxy {
    /// Proxy to `base_url`, rewriting cookies to `cookie_domain`.
    pub fn new(base_url: impl Into<String>, cookie_domain: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_domain,
        }
    }

    /// Forward one request to `{base_url}/{path}`.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, ServerError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "Proxying auth request");

        let mut request = self.client.request(method, &url);
        for name in &FORWARDED_HEADERS {
            for value in headers.get_all(name) {
                request = request.header(name, value);
            }
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let upstream = request.send().await.map_err(|e| {
            warn!(error = %e, %url, "Authentication service unreachable");
            ServerError::Upstream("Authentication service unavailable".to_string())
        })?;

        let status = upstream.status();
        let mut response = Response::builder().status(status);
        if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
            response = response.header(CONTENT_TYPE, content_type);
        }
        for cookie in upstream.headers().get_all(SET_COOKIE) {
            let Ok(cookie) = cookie.to_str() else {
                warn!("Dropping non-ASCII Set-Cookie header");
                continue;
            };
            response = response.header(
                SET_COOKIE,
                rewrite_set_cookie(cookie, self.cookie_domain.as_deref()),
            );
        }

        let bytes = upstream.bytes().await.map_err(|e| {
            warn!(error = %e, %url, "Failed to read authentication response");
            ServerError::Upstream("Authentication service unavailable".to_string())
        })?;
        debug!(status = status.as_u16(), "Auth request proxied");

        response
            .body(Body::from(bytes))
            .map_err(|e| ServerError::Upstream(e.to_string()))
    }
}
