// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated athletes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Activity;
use crate::services::{filter_and_sort, ActivityWindow};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// API routes (require authentication via session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/activities", get(get_activities))
}

/// Terminus activities for the signed-in athlete, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Activity>>> {
    let activities = load_activities(&state, user.athlete_id).await?;
    Ok(Json(activities.as_ref().clone()))
}

/// Fetch, filter and cache the athlete's activities.
///
/// Served from the per-athlete cache while it is fresh. A 401 from Strava
/// means the stored token is no longer any good, so the session is dropped.
pub async fn load_activities(state: &AppState, athlete_id: u64) -> Result<Arc<Vec<Activity>>> {
    let now = Utc::now();
    if let Some(cached) = state.activity_cache.get(athlete_id, now) {
        tracing::debug!(athlete_id, count = cached.len(), "Serving cached activities");
        return Ok(cached);
    }

    let access_token = state
        .tokens
        .valid_access_token(athlete_id, &state.strava)
        .await?;
    let window = ActivityWindow::new(state.config.activities_start, now)?;

    let started = Instant::now();
    let fetched = match state.strava.fetch_all_activities(&access_token, window).await {
        Ok(fetched) => fetched,
        Err(e) if e.is_strava_token_error() => {
            tracing::warn!(athlete_id, "Strava rejected access token, dropping session");
            state.tokens.remove(athlete_id);
            state.activity_cache.invalidate(athlete_id);
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    let fetched_count = fetched.len();
    let activities = Arc::new(filter_and_sort(fetched));

    tracing::info!(
        athlete_id,
        fetched = fetched_count,
        kept = activities.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Fetched activities from Strava"
    );

    state
        .activity_cache
        .insert(athlete_id, activities.clone(), now);
    Ok(activities)
}
