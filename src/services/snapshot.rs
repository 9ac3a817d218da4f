// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot batch job.
//!
//! One run:
//! 1. Exchange the refresh token for an access token
//! 2. Fetch every page of the activity window concurrently
//! 3. Keep the "terminus" activities, newest first
//! 4. Overwrite the snapshot file with the result

use crate::config::{ConfigError, JobConfig, RefreshCredentials};
use crate::error::{AppError, Result};
use crate::models::Activity;
use crate::services::filter::filter_and_sort;
use crate::services::strava::{ActivityWindow, StravaClient};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Write `activities` as a pretty-printed JSON array, replacing any previous file.
pub fn write_snapshot(path: &Path, activities: &[Activity]) -> Result<()> {
    let json = serde_json::to_string_pretty(activities)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize snapshot: {}", e)))?;

    std::fs::write(path, json).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a snapshot written by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<Vec<Activity>> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid snapshot {}: {}", path.display(), e)))
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub fetched: usize,
    pub kept: usize,
    pub path: PathBuf,
}

/// Fetch, filter and persist one snapshot.
pub struct SnapshotJob {
    client: StravaClient,
    refresh_token: String,
    activities_start: DateTime<Utc>,
    snapshot_path: PathBuf,
}

impl SnapshotJob {
    pub fn new(credentials: RefreshCredentials, config: &JobConfig) -> Self {
        let client = StravaClient::new(credentials.client_id, credentials.client_secret)
            .with_base_urls(&config.strava_api_url, &config.strava_oauth_url);

        Self {
            client,
            refresh_token: credentials.refresh_token,
            activities_start: config.activities_start,
            snapshot_path: config.snapshot_path.clone(),
        }
    }

    /// Build a job from a credential lookup; fails before any request if a credential is missing.
    pub fn from_lookup<F>(lookup: F, config: &JobConfig) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::new(RefreshCredentials::from_lookup(lookup)?, config))
    }

    /// Exchange the stored refresh token for a bearer token.
    pub async fn access_token(&self) -> Result<String> {
        let response = self.client.refresh_token(&self.refresh_token).await?;
        Ok(response.access_token)
    }

    pub async fn run(&self) -> Result<SnapshotReport> {
        let window = ActivityWindow::ending_now(self.activities_start)?;
        let access_token = self.access_token().await?;

        tracing::info!(after = window.after, before = window.before, "Fetching activities from Strava");
        let all = self.client.fetch_all_activities(&access_token, window).await?;
        let fetched = all.len();
        tracing::info!(count = fetched, "Fetched activities");

        let filtered = filter_and_sort(all);
        tracing::info!(count = filtered.len(), "Filtered to terminus activities");

        write_snapshot(&self.snapshot_path, &filtered)?;
        tracing::info!(path = %self.snapshot_path.display(), "Activities saved");

        Ok(SnapshotReport {
            fetched,
            kept: filtered.len(),
            path: self.snapshot_path.clone(),
        })
    }
}
