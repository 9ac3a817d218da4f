// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terminus Tracker web server
//!
//! Signs athletes in with Strava and serves their terminus rides as JSON
//! and as a server-rendered dashboard.

use std::sync::Arc;
use terminus_tracker::{config::Config, logging::init_logging, routes::create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        activities_start = %config.activities_start,
        "Starting Terminus Tracker"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
