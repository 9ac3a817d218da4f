// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrent page aggregation.

use crate::error::AppError;
use crate::models::Activity;
use futures_util::future::try_join_all;
use std::future::Future;

/// Fetch pages `1..=pages` concurrently and concatenate the results in page order.
///
/// Every page is requested, even after a short or empty one. The first page
/// error resolves the whole call; the other in-flight requests are dropped.
pub async fn fetch_all_pages<F, Fut>(pages: u32, fetch_page: F) -> Result<Vec<Activity>, AppError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Activity>, AppError>>,
{
    let requests: Vec<Fut> = (1..=pages).map(fetch_page).collect();
    let results = try_join_all(requests).await?;

    let activities: Vec<Activity> = results
        .into_iter()
        .filter(|page| !page.is_empty())
        .flatten()
        .collect();

    tracing::debug!(pages, count = activities.len(), "Aggregated activity pages");
    Ok(activities)
}
