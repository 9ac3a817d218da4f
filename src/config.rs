// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The web server and the snapshot job read different subsets of the
//! environment: [`Config`] for the server, [`JobConfig`] plus
//! [`RefreshCredentials`] for the batch job.

use chrono::{DateTime, Utc};
use std::env;
use std::path::PathBuf;

/// Default Strava REST API base URL.
pub const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
/// Default Strava OAuth base URL.
pub const DEFAULT_STRAVA_OAUTH_URL: &str = "https://www.strava.com/oauth";
/// Activities before this instant are never requested.
pub const DEFAULT_ACTIVITIES_START_DATE: &str = "2025-03-22T00:00:00Z";
/// Where the snapshot job writes its output.
pub const DEFAULT_SNAPSHOT_PATH: &str = "static/activities.json";

/// Web server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Strava REST API base URL
    pub strava_api_url: String,
    /// Strava OAuth base URL
    pub strava_oauth_url: String,
    /// Externally visible URL of this server (for the OAuth redirect)
    pub public_url: String,
    /// Lower bound of the activity window
    pub activities_start: DateTime<Utc>,
    /// HS256 key for session JWTs and OAuth state signatures (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_api_url: DEFAULT_STRAVA_API_URL.to_string(),
            strava_oauth_url: DEFAULT_STRAVA_OAUTH_URL.to_string(),
            public_url: "http://localhost:8080".to_string(),
            activities_start: default_activities_start(),
            session_signing_key: b"test_session_key_32_bytes_min!!".to_vec(),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_API_URL.to_string()),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_OAUTH_URL.to_string()),
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            activities_start: activities_start_from_env()?,
            session_signing_key: required("SESSION_SIGNING_KEY")?.into_bytes(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Settings for the snapshot batch job (everything except credentials).
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub strava_api_url: String,
    pub strava_oauth_url: String,
    pub activities_start: DateTime<Utc>,
    pub snapshot_path: PathBuf,
}

impl JobConfig {
    /// Load job settings from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_API_URL.to_string()),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_OAUTH_URL.to_string()),
            activities_start: activities_start_from_env()?,
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
        })
    }
}

/// The three credentials the snapshot job exchanges for a bearer token.
#[derive(Clone)]
pub struct RefreshCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl RefreshCredentials {
    /// Load credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.
    ///
    /// Absent and blank values are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            client_id: get("STRAVA_CLIENT_ID")?,
            client_secret: get("STRAVA_CLIENT_SECRET")?,
            refresh_token: get("STRAVA_REFRESH_TOKEN")?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn default_activities_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(DEFAULT_ACTIVITIES_START_DATE)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn activities_start_from_env() -> Result<DateTime<Utc>, ConfigError> {
    match env::var("ACTIVITIES_START_DATE") {
        Ok(raw) => parse_start_date(&raw),
        Err(_) => Ok(default_activities_start()),
    }
}

/// Parse an RFC 3339 start date.
pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConfigError::Invalid {
            key: "ACTIVITIES_START_DATE",
            message: e.to_string(),
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
