// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card list view.

use crate::models::Activity;
use crate::presentation::format::{format_date, ActivityMeta};
use maud::{html, Markup};

/// Shown instead of cards when the list is empty.
pub const NO_TERMINUS_ACTIVITIES: &str = "No activities found with \"Terminus\".";

/// Render one linked card per activity.
pub fn render_cards(activities: &[Activity]) -> Markup {
    html! {
        @if activities.is_empty() {
            p { (NO_TERMINUS_ACTIVITIES) }
        }
        @for activity in activities {
            (render_card(activity))
        }
    }
}

fn render_card(activity: &Activity) -> Markup {
    let meta = ActivityMeta::of(activity);
    let date = format_date(&activity.start_date);

    html! {
        a class="activity" href=(activity.strava_url()) target="_blank" rel="noopener noreferrer" {
            strong { (activity.name) }
            @if !date.is_empty() {
                em { (date) }
            }
            span class="description" { (activity.description.as_deref().unwrap_or_default()) }
            div class="activity-meta" {
                span class="distance" { (meta.distance) }
                span class="time" { (meta.time) }
                span class="speed" { (meta.speed) }
                span class="elevation" { (meta.elevation) }
            }
        }
    }
}
