// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered dashboard.

use crate::error::AppError;
use crate::middleware::auth::authenticate;
use crate::models::Activity;
use crate::presentation::dashboard::{LOAD_ERROR_MESSAGE, VIEW_MODE_KEY};
use crate::presentation::{Dashboard, FetchOutcome, PreferenceStore, SortState};
use crate::routes::api::load_activities;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

/// How long the browser keeps the view preference.
const PREFERENCE_MAX_AGE_DAYS: i64 = 365;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/view/toggle", get(toggle_view))
}

/// Preferences kept in browser cookies.
struct CookiePreferences {
    jar: CookieJar,
}

impl CookiePreferences {
    fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl PreferenceStore for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.jar.get(key).map(|c| c.value().to_string())
    }

    fn set(&mut self, key: &str, value: &str) {
        let cookie = Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(PREFERENCE_MAX_AGE_DAYS))
            .build();
        self.jar = self.jar.clone().add(cookie);
    }
}

#[derive(Deserialize)]
pub struct SortParams {
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    dir: Option<String>,
}

/// What the page shows for a given load result.
///
/// Anything the browser would see as a non-success status shows the login
/// affordance; only a broken connection to Strava is reported as an error.
fn outcome_of(result: Result<Vec<Activity>, AppError>) -> FetchOutcome {
    match result {
        Ok(activities) => FetchOutcome::Loaded(activities),
        Err(AppError::Transport(e)) => {
            tracing::warn!(error = %e, "Could not load activities for dashboard");
            FetchOutcome::Failed(LOAD_ERROR_MESSAGE.to_string())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Dashboard falling back to login");
            FetchOutcome::Unauthenticated
        }
    }
}

async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<SortParams>,
) -> Html<String> {
    let outcome = match authenticate(&jar, &headers, &state.config.session_signing_key) {
        Some(user) => outcome_of(
            load_activities(&state, user.athlete_id)
                .await
                .map(|list| list.as_ref().clone()),
        ),
        None => FetchOutcome::Unauthenticated,
    };

    let prefs = CookiePreferences::new(jar);
    let mut dashboard = Dashboard::new();
    dashboard.load(outcome, &prefs);
    dashboard.set_sort(SortState::from_query(
        params.sort.as_deref(),
        params.dir.as_deref(),
    ));

    Html(dashboard.render_page().into_string())
}

/// Flip the stored view preference and go back to the dashboard.
async fn toggle_view(jar: CookieJar) -> (CookieJar, Redirect) {
    let mut prefs = CookiePreferences::new(jar);
    let mut dashboard = Dashboard::new();
    dashboard.restore_view(&prefs);
    dashboard.toggle_view(&mut prefs);

    tracing::debug!(
        view = prefs.get(VIEW_MODE_KEY).as_deref().unwrap_or_default(),
        "View toggled"
    );
    (prefs.into_jar(), Redirect::to("/"))
}
