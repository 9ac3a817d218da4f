// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory per-athlete state for the web server: Strava tokens and
//! recently fetched activity lists.

use crate::error::AppError;
use crate::models::Activity;
use crate::services::strava::{StravaClient, TokenResponse};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// How long a fetched activity list is served before refetching (10 minutes).
pub const ACTIVITY_CACHE_TTL_SECS: i64 = 10 * 60;

/// Strava tokens held for one athlete.
#[derive(Clone)]
pub struct StoredTokens {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredTokens {
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < expires_at,
            None => true,
        }
    }
}

impl From<TokenResponse> for StoredTokens {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

/// Shared token store, keyed by Strava athlete ID.
#[derive(Clone, Default)]
pub struct TokenStore {
    tokens: Arc<DashMap<u64, StoredTokens>>,
}

impl TokenStore {
    pub fn insert(&self, athlete_id: u64, tokens: StoredTokens) {
        self.tokens.insert(athlete_id, tokens);
    }

    pub fn remove(&self, athlete_id: u64) {
        self.tokens.remove(&athlete_id);
    }

    pub fn contains(&self, athlete_id: u64) -> bool {
        self.tokens.contains_key(&athlete_id)
    }

    /// Get a usable access token, refreshing it first if it expires soon.
    ///
    /// Athletes without stored tokens are unauthenticated.
    pub async fn valid_access_token(
        &self,
        athlete_id: u64,
        client: &StravaClient,
    ) -> Result<String, AppError> {
        let current = self
            .tokens
            .get(&athlete_id)
            .map(|entry| entry.clone())
            .ok_or(AppError::Unauthorized)?;

        if current.is_fresh(Utc::now()) {
            return Ok(current.access_token);
        }

        let Some(refresh_token) = current.refresh_token.as_deref() else {
            tracing::info!(athlete_id, "Access token expired and no refresh token stored");
            self.remove(athlete_id);
            return Err(AppError::Unauthorized);
        };

        tracing::info!(athlete_id, "Access token expired, refreshing");
        let response = match client.refresh_token(refresh_token).await {
            Ok(response) => response,
            Err(AppError::UpstreamAuth { status, .. }) if (400..500).contains(&status) => {
                tracing::warn!(athlete_id, status, "Refresh token rejected, dropping session");
                self.remove(athlete_id);
                return Err(AppError::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        let mut refreshed = StoredTokens::from(response);
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = current.refresh_token.clone();
        }
        let access_token = refreshed.access_token.clone();
        self.insert(athlete_id, refreshed);

        tracing::info!(athlete_id, "Token refreshed");
        Ok(access_token)
    }
}

#[derive(Clone)]
struct CachedActivities {
    activities: Arc<Vec<Activity>>,
    fetched_at: DateTime<Utc>,
}

/// Filtered activity lists per athlete, valid for [`ACTIVITY_CACHE_TTL_SECS`].
#[derive(Clone, Default)]
pub struct ActivityCache {
    entries: Arc<DashMap<u64, CachedActivities>>,
}

impl ActivityCache {
    /// Cached list for `athlete_id` if it is younger than the TTL at `now`.
    pub fn get(&self, athlete_id: u64, now: DateTime<Utc>) -> Option<Arc<Vec<Activity>>> {
        let entry = self.entries.get(&athlete_id)?;
        if now - entry.fetched_at < Duration::seconds(ACTIVITY_CACHE_TTL_SECS) {
            Some(entry.activities.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, athlete_id: u64, activities: Arc<Vec<Activity>>, now: DateTime<Utc>) {
        self.entries.insert(
            athlete_id,
            CachedActivities {
                activities,
                fetched_at: now,
            },
        );
    }

    pub fn invalidate(&self, athlete_id: u64) {
        self.entries.remove(&athlete_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_expires_after_ttl() {
        let cache = ActivityCache::default();
        let now = Utc::now();
        let list = Arc::new(vec![Activity::new(1, "terminus", "2025-04-01T00:00:00Z")]);

        cache.insert(7, list, now);

        assert!(cache.get(7, now + Duration::seconds(60)).is_some());
        assert!(cache
            .get(7, now + Duration::seconds(ACTIVITY_CACHE_TTL_SECS))
            .is_none());
        assert!(cache.get(8, now).is_none());
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        let soon = StoredTokens::new("a".into(), None, Some(now + Duration::seconds(60)));
        let later = StoredTokens::new("a".into(), None, Some(now + Duration::hours(2)));
        let unknown = StoredTokens::new("a".into(), None, None);

        assert!(!soon.is_fresh(now));
        assert!(later.is_fresh(now));
        assert!(unknown.is_fresh(now));
    }

    #[tokio::test]
    async fn test_unknown_athlete_is_unauthorized() {
        let store = TokenStore::default();
        let client = StravaClient::new("id".into(), "secret".into());
        let err = store.valid_access_token(1, &client).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_fresh_token_returned_without_refresh() {
        let store = TokenStore::default();
        // Unroutable base URL: any network call would fail the test.
        let client = StravaClient::new("id".into(), "secret".into())
            .with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
        store.insert(
            1,
            StoredTokens::new(
                "live".into(),
                Some("refresh".into()),
                Some(Utc::now() + Duration::hours(1)),
            ),
        );

        assert_eq!(store.valid_access_token(1, &client).await.unwrap(), "live");
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_drops_session() {
        let store = TokenStore::default();
        let client = StravaClient::new("id".into(), "secret".into());
        store.insert(
            1,
            StoredTokens::new("old".into(), None, Some(Utc::now() - Duration::hours(1))),
        );

        let err = store.valid_access_token(1, &client).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert!(!store.contains(1));
    }
}
