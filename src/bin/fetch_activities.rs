// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot job: fetch the configured athlete's activities, keep the
//! terminus rides and write them to `SNAPSHOT_PATH`.
//!
//! Exits non-zero on any configuration, Strava or write failure.

use std::process::ExitCode;
use terminus_tracker::config::{JobConfig, RefreshCredentials};
use terminus_tracker::error::AppError;
use terminus_tracker::logging::init_logging;
use terminus_tracker::services::{SnapshotJob, SnapshotReport};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(report) => {
            tracing::info!(
                fetched = report.fetched,
                kept = report.kept,
                path = %report.path.display(),
                "Snapshot complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Snapshot failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SnapshotReport, AppError> {
    let config = JobConfig::from_env()?;
    let credentials = RefreshCredentials::from_env()?;
    tracing::debug!(?credentials, "Loaded Strava credentials");

    SnapshotJob::new(credentials, &config).run().await
}
