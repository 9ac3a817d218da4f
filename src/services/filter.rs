// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyword filter and recency ordering.

use crate::models::Activity;

/// Keyword that marks an activity as part of the challenge.
pub const TERMINUS_KEYWORD: &str = "terminus";

/// Whether `activity` mentions `keyword` in its name or description (case-insensitive).
///
/// `keyword` must already be lowercase.
pub fn matches_keyword(activity: &Activity, keyword: &str) -> bool {
    activity.name.to_lowercase().contains(keyword)
        || activity
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(keyword)
}

/// Keep activities mentioning "terminus" and order them most recent first.
pub fn filter_and_sort(activities: Vec<Activity>) -> Vec<Activity> {
    filter_and_sort_by(activities, TERMINUS_KEYWORD)
}

/// Keep activities mentioning `keyword` and order them by `start_date`, newest first.
///
/// `start_date` is compared as a string; Strava's ISO 8601 timestamps are
/// fixed-width UTC so lexical order is chronological.
pub fn filter_and_sort_by(activities: Vec<Activity>, keyword: &str) -> Vec<Activity> {
    let keyword = keyword.to_lowercase();
    let mut filtered: Vec<Activity> = activities
        .into_iter()
        .filter(|a| matches_keyword(a, &keyword))
        .collect();

    filtered.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    filtered
}
