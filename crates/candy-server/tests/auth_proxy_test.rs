// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Authentication proxy tests against a mock authentication service.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use wiremock::matchers::{body_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TestContext, api};

#[tokio::test]
async fn test_login_is_forwarded_with_cookie_rewrite() {
    let auth = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header_eq("content-type", "application/json"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": {"id": "u1"}}))
                .append_header(
                    "set-cookie",
                    "auth_token=abc; Path=/; Domain=auth.internal; HttpOnly",
                ),
        )
        .expect(1)
        .mount(&auth)
        .await;

    let ctx = TestContext::with_auth_url(&auth.uri(), Some(".candy.example")).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(api("/auth/login"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": "ada@example.com", "password": "pw"}).to_string(),
        ))
        .unwrap();

    let res = ctx.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({"user": {"id": "u1"}}));
    assert_eq!(
        res.headers.get(header::SET_COOKIE).unwrap(),
        "auth_token=abc; Path=/; HttpOnly; Domain=.candy.example"
    );
}

#[tokio::test]
async fn test_validate_forwards_cookie_and_relays_status() {
    let auth = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/validate"))
        .and(header_eq("cookie", "auth_token=expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"valid": false})))
        .mount(&auth)
        .await;

    let ctx = TestContext::with_auth_url(&auth.uri(), None).await;
    let request = Request::builder()
        .method(Method::GET)
        .uri(api("/auth/validate"))
        .header(header::COOKIE, "auth_token=expired")
        .body(Body::empty())
        .unwrap();

    let res = ctx.send(request).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, json!({"valid": false}));
}

#[tokio::test]
async fn test_logout_drops_domain_without_cookie_domain() {
    let auth = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(
            ResponseTemplate::new(204)
                .append_header("set-cookie", "auth_token=; Max-Age=0; Domain=auth.internal"),
        )
        .mount(&auth)
        .await;

    let ctx = TestContext::with_auth_url(&auth.uri(), None).await;
    let res = ctx
        .call_with_token(Method::POST, &api("/auth/logout"), None, None)
        .await;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(
        res.headers.get(header::SET_COOKIE).unwrap(),
        "auth_token=; Max-Age=0"
    );
}

#[tokio::test]
async fn test_register_unreachable_service_is_bad_gateway() {
    // Nothing listens on the discard port.
    let ctx = TestContext::new().await;
    let res = ctx
        .call_with_token(
            Method::POST,
            &api("/auth/register"),
            Some(json!({"email": "a@b.c"})),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.body["statusCode"], 502);
}
