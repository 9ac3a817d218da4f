// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Terminus Tracker: Strava rides that reached the end of the line
//!
//! This crate fetches an athlete's Strava activities, keeps the ones that
//! mention "terminus", and presents them as cards or a sortable table. It
//! backs both the web server and the `fetch-activities` snapshot job.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod presentation;
pub mod routes;
pub mod services;

use config::Config;
use services::{ActivityCache, StravaClient, TokenStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub tokens: TokenStore,
    pub activity_cache: ActivityCache,
}

impl AppState {
    /// Fresh state with empty token store and cache.
    pub fn new(config: Config) -> Self {
        let strava = StravaClient::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        )
        .with_base_urls(&config.strava_api_url, &config.strava_oauth_url);

        Self {
            config,
            strava,
            tokens: TokenStore::default(),
            activity_cache: ActivityCache::default(),
        }
    }
}
