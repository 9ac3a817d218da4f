// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process fake of the Strava API and a router
//! wired to it.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use terminus_tracker::config::Config;
use terminus_tracker::middleware::auth::{create_jwt, SESSION_COOKIE};
use terminus_tracker::routes::create_router;
use terminus_tracker::services::{StoredTokens, StravaClient};
use terminus_tracker::AppState;

/// Access token the fake hands out and expects back.
pub const FAKE_ACCESS_TOKEN: &str = "fake_access_token";

/// Athlete returned by the fake authorization code exchange.
pub const FAKE_ATHLETE_ID: u64 = 4242;

/// Recorded traffic and canned responses for the fake Strava server.
#[derive(Default)]
pub struct FakeStravaState {
    pub token_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub page_queries: Mutex<Vec<HashMap<String, String>>>,
    pages: Mutex<HashMap<u32, Vec<Value>>>,
    page_failures: Mutex<HashMap<u32, u16>>,
    token_failure: AtomicU16,
}

/// A fake Strava API and OAuth host listening on a local port.
pub struct FakeStrava {
    pub base_url: String,
    pub state: Arc<FakeStravaState>,
}

#[allow(dead_code)]
impl FakeStrava {
    pub async fn start() -> Self {
        let state = Arc::new(FakeStravaState::default());

        let app = Router::new()
            .route("/oauth/token", post(fake_token))
            .route("/api/v3/athlete/activities", get(fake_activities))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/api/v3", self.base_url)
    }

    pub fn oauth_url(&self) -> String {
        format!("{}/oauth", self.base_url)
    }

    pub fn client(&self) -> StravaClient {
        StravaClient::new("test_client_id".to_string(), "test_secret".to_string())
            .with_base_urls(&self.api_url(), &self.oauth_url())
    }

    pub fn set_page(&self, page: u32, activities: Vec<Value>) {
        self.state.pages.lock().unwrap().insert(page, activities);
    }

    pub fn fail_page(&self, page: u32, status: u16) {
        self.state.page_failures.lock().unwrap().insert(page, status);
    }

    pub fn fail_token(&self, status: u16) {
        self.state.token_failure.store(status, Ordering::SeqCst);
    }

    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.state.page_calls.load(Ordering::SeqCst)
    }

    /// Query strings of every page request, in arrival order.
    pub fn page_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.page_queries.lock().unwrap().clone()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.token_forms.lock().unwrap().clone()
    }
}

async fn fake_token(
    State(state): State<Arc<FakeStravaState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    let grant_type = form.get("grant_type").cloned().unwrap_or_default();
    state.token_forms.lock().unwrap().push(form);

    let failure = state.token_failure.load(Ordering::SeqCst);
    if failure != 0 {
        let status = StatusCode::from_u16(failure).unwrap();
        return (status, Json(json!({"message": "Bad Request"}))).into_response();
    }

    let expires_at = chrono::Utc::now().timestamp() + 6 * 3600;
    let mut body = json!({
        "token_type": "Bearer",
        "access_token": FAKE_ACCESS_TOKEN,
        "refresh_token": "rotated_refresh_token",
        "expires_at": expires_at,
        "expires_in": 21600,
    });
    if grant_type == "authorization_code" {
        body["athlete"] = json!({"id": FAKE_ATHLETE_ID, "firstname": "Test", "lastname": "Rider"});
    }
    Json(body).into_response()
}

async fn fake_activities(
    State(state): State<Arc<FakeStravaState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.page_calls.fetch_add(1, Ordering::SeqCst);
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    state.page_queries.lock().unwrap().push(query);

    let expected = format!("Bearer {}", FAKE_ACCESS_TOKEN);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Authorization Error"})),
        )
            .into_response();
    }

    let failure = state.page_failures.lock().unwrap().get(&page).copied();
    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({"message": "error"}))).into_response();
    }

    let activities = state
        .pages
        .lock()
        .unwrap()
        .get(&page)
        .cloned()
        .unwrap_or_default();
    Json(activities).into_response()
}

/// A minimal activity as Strava lists it.
#[allow(dead_code)]
pub fn activity_json(id: u64, name: &str, start_date: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "start_date": start_date,
        "distance": 10_000.0,
        "moving_time": 1800,
        "total_elevation_gain": 42.0,
        "sport_type": "Ride",
    })
}

/// Create a test app whose Strava client points at `fake`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(fake: &FakeStrava) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.strava_api_url = fake.api_url();
    config.strava_oauth_url = fake.oauth_url();

    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Create a test app that must never reach Strava.
#[allow(dead_code)]
pub fn create_offline_app() -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.strava_api_url = "http://127.0.0.1:9/api/v3".to_string();
    config.strava_oauth_url = "http://127.0.0.1:9/oauth".to_string();

    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Store a fresh token for `athlete_id` and return a matching `Cookie` header.
#[allow(dead_code)]
pub fn sign_in(state: &AppState, athlete_id: u64) -> String {
    state.tokens.insert(
        athlete_id,
        StoredTokens::new(
            FAKE_ACCESS_TOKEN.to_string(),
            Some("refresh_token".to_string()),
            Some(chrono::Utc::now() + chrono::Duration::hours(6)),
        ),
    );
    session_cookie_header(state, athlete_id)
}

/// `Cookie` header value carrying a valid session JWT.
#[allow(dead_code)]
pub fn session_cookie_header(state: &AppState, athlete_id: u64) -> String {
    let jwt = create_jwt(athlete_id, &state.config.session_signing_key).unwrap();
    format!("{}={}", SESSION_COOKIE, jwt)
}

/// Read a response body as a string.
#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
