// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;

/// Application error type shared by the web server and the snapshot job.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Strava token exchange failed: {status} {reason}")]
    UpstreamAuth { status: u16, reason: String },

    #[error("Strava API error: {status} {reason}")]
    UpstreamApi { status: u16, reason: String },

    #[error("Strava request failed: {0}")]
    Transport(String),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether Strava rejected the bearer token itself.
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::UpstreamApi { status: 401, .. })
    }

    /// Build an upstream API error from a non-success status.
    pub fn upstream_api(status: reqwest::StatusCode) -> Self {
        AppError::UpstreamApi {
            status: status.as_u16(),
            reason: reason_text(status),
        }
    }

    /// Build a token exchange error from a non-success status.
    pub fn upstream_auth(status: reqwest::StatusCode) -> Self {
        AppError::UpstreamAuth {
            status: status.as_u16(),
            reason: reason_text(status),
        }
    }
}

fn reason_text(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::UpstreamAuth { .. } => {
                tracing::warn!(error = %self, "Strava token exchange failed");
                (StatusCode::BAD_GATEWAY, "strava_auth_error", None)
            }
            AppError::UpstreamApi { .. } | AppError::Transport(_) => {
                tracing::warn!(error = %self, "Strava request failed");
                (StatusCode::BAD_GATEWAY, "strava_error", Some(self.to_string()))
            }
            AppError::Configuration(err) => {
                tracing::error!(error = %err, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
            }
            AppError::Io { .. } => {
                tracing::error!(error = %self, "I/O error");
                (StatusCode::INTERNAL_SERVER_ERROR, "io_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
