// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Refresh-token and authorization-code exchanges
//! - Listing one page of athlete activities inside a time window
//! - Fetching all pages of a window concurrently

use crate::config::{ConfigError, DEFAULT_STRAVA_API_URL, DEFAULT_STRAVA_OAUTH_URL};
use crate::error::AppError;
use crate::models::Activity;
use crate::services::aggregate::fetch_all_pages;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activities requested per page (Strava's maximum).
pub const PER_PAGE: u32 = 200;

/// Pages requested on every run, whether or not earlier pages came back short.
pub const MAX_PAGES: u32 = 10;

/// Half-open `[after, before)` window in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub after: i64,
    pub before: i64,
}

impl ActivityWindow {
    /// Window from `start` up to `now`.
    pub fn new(start: DateTime<Utc>, now: DateTime<Utc>) -> Result<Self, ConfigError> {
        let after = start.timestamp();
        let before = now.timestamp();
        if after >= before {
            return Err(ConfigError::Invalid {
                key: "ACTIVITIES_START_DATE",
                message: format!("start {} is not before now", start.to_rfc3339()),
            });
        }
        Ok(Self { after, before })
    }

    /// Window from `start` up to the current time.
    pub fn ending_now(start: DateTime<Utc>) -> Result<Self, ConfigError> {
        Self::new(start, Utc::now())
    }
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: DEFAULT_STRAVA_API_URL.to_string(),
            oauth_url: DEFAULT_STRAVA_OAUTH_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Point the client at different API and OAuth hosts.
    pub fn with_base_urls(mut self, api_url: &str, oauth_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.oauth_url = oauth_url.trim_end_matches('/').to_string();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// URL of the Strava authorization page.
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.oauth_url)
    }

    /// Exchange a refresh token for a fresh access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[("refresh_token", refresh_token), ("grant_type", "refresh_token")])
            .await
    }

    /// Exchange an OAuth authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[("code", code), ("grant_type", "authorization_code")])
            .await
    }

    async fn token_request(&self, grant: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        form.extend_from_slice(grant);

        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(AppError::upstream_auth(status));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse token response: {}", e)))
    }

    /// List one page of the athlete's activities inside `window`.
    ///
    /// An empty page means there is nothing at or beyond `page`.
    pub async fn list_activities_page(
        &self,
        access_token: &str,
        page: u32,
        window: ActivityWindow,
    ) -> Result<Vec<Activity>, AppError> {
        let url = format!("{}/athlete/activities", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("after", window.after.to_string()),
                ("before", window.before.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            if status.as_u16() == 429 {
                tracing::warn!(page, "Strava rate limit hit (429)");
            }
            return Err(AppError::upstream_api(status));
        }

        let activities: Vec<Activity> = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("JSON parse error: {}", e)))?;

        tracing::debug!(page, count = activities.len(), "Fetched activity page");
        Ok(activities)
    }

    /// Fetch pages `1..=MAX_PAGES` concurrently and concatenate them in page order.
    pub async fn fetch_all_activities(
        &self,
        access_token: &str,
        window: ActivityWindow,
    ) -> Result<Vec<Activity>, AppError> {
        fetch_all_pages(MAX_PAGES, |page| {
            self.list_activities_page(access_token, page, window)
        })
        .await
    }
}

/// Token response from Strava's `/oauth/token`.
///
/// Refresh responses carry no athlete; code exchanges do.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub athlete: Option<StravaAthlete>,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}
