// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `/activities` authentication tests.
//!
//! These tests verify that:
//! 1. The endpoint rejects requests without a valid session
//! 2. A valid session gets the filtered, sorted list
//! 3. Results are cached per athlete
//! 4. A token Strava rejects ends the session

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use terminus_tracker::middleware::auth::create_jwt;
use terminus_tracker::services::StoredTokens;
use tower::ServiceExt;

mod common;
use common::{activity_json, body_string, create_offline_app, create_test_app, sign_in, FakeStrava};

fn get_activities(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/activities");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_activities_without_session() {
    let (app, _) = create_offline_app();

    let response = app.oneshot(get_activities(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_activities_with_forged_session() {
    let (app, _) = create_offline_app();
    let forged = create_jwt(1, b"not_the_server_key").unwrap();

    let response = app
        .oneshot(get_activities(Some(&format!("terminus_session={}", forged))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activities_with_expired_session() {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let (app, state) = create_offline_app();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: "1".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.session_signing_key),
    )
    .unwrap();

    let response = app
        .oneshot(get_activities(Some(&format!("terminus_session={}", expired))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_without_stored_tokens() {
    let (app, state) = create_offline_app();
    let cookie = common::session_cookie_header(&state, 77);

    let response = app.oneshot(get_activities(Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activities_with_session() {
    let fake = FakeStrava::start().await;
    fake.set_page(
        1,
        vec![
            activity_json(10, "Coffee ride", "2025-04-05T08:00:00Z"),
            activity_json(11, "Terminus run", "2025-04-01T08:00:00Z"),
            activity_json(12, "terminus two", "2025-04-03T08:00:00Z"),
        ],
    );
    let (app, state) = create_test_app(&fake);
    let cookie = sign_in(&state, 5);

    let response = app.oneshot(get_activities(Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![12, 11]);
    assert_eq!(body[0]["sport_type"], "Ride");
}

#[tokio::test]
async fn test_bearer_header_session() {
    let fake = FakeStrava::start().await;
    let (app, state) = create_test_app(&fake);
    sign_in(&state, 6);
    let jwt = create_jwt(6, &state.config.session_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/activities")
                .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "[]");
}

#[tokio::test]
async fn test_second_request_served_from_cache() {
    let fake = FakeStrava::start().await;
    fake.set_page(1, vec![activity_json(1, "terminus", "2025-04-01T08:00:00Z")]);
    let (app, state) = create_test_app(&fake);
    let cookie = sign_in(&state, 8);

    let first = app
        .clone()
        .oneshot(get_activities(Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(fake.page_calls(), 10);

    let second = app.oneshot(get_activities(Some(&cookie))).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(fake.page_calls(), 10);
}

#[tokio::test]
async fn test_rejected_strava_token_drops_session() {
    let fake = FakeStrava::start().await;
    let (app, state) = create_test_app(&fake);
    state.tokens.insert(
        9,
        StoredTokens::new(
            "revoked_token".to_string(),
            Some("refresh".to_string()),
            Some(chrono::Utc::now() + chrono::Duration::hours(1)),
        ),
    );
    let cookie = common::session_cookie_header(&state, 9);

    let response = app.oneshot(get_activities(Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!state.tokens.contains(9));
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_before_use() {
    let fake = FakeStrava::start().await;
    let (app, state) = create_test_app(&fake);
    state.tokens.insert(
        3,
        StoredTokens::new(
            "old_token".to_string(),
            Some("refresh".to_string()),
            Some(chrono::Utc::now() + chrono::Duration::seconds(30)),
        ),
    );
    let cookie = common::session_cookie_header(&state, 3);

    let response = app.oneshot(get_activities(Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fake.token_calls(), 1);
    assert_eq!(fake.token_forms()[0]["refresh_token"], "refresh");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let fake = FakeStrava::start().await;
    fake.fail_page(2, 500);
    let (app, state) = create_test_app(&fake);
    let cookie = sign_in(&state, 4);

    let response = app.oneshot(get_activities(Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    // The session survives errors that are not about the token.
    assert!(state.tokens.contains(4));
}
