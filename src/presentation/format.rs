// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display formatting for activity metrics.

use crate::models::Activity;
use chrono::{DateTime, Datelike};

/// Placeholder for a metric that is absent or zero.
pub const NOT_AVAILABLE: &str = "N/A";

/// Meters as kilometers with two decimals.
pub fn format_distance(meters: f64) -> String {
    if meters == 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2} km", meters / 1000.0)
}

/// Seconds as `{h}h {m}m {s}s`, dropping the hour segment when it is zero.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return NOT_AVAILABLE.to_string();
    }
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else {
        format!("{m}m {s}s")
    }
}

/// Average speed in km/h with two decimals.
pub fn format_speed(meters: f64, seconds: u64) -> String {
    if meters == 0.0 || seconds == 0 {
        return NOT_AVAILABLE.to_string();
    }
    let kmh = (meters / 1000.0) / (seconds as f64 / 3600.0);
    format!("{:.2} km/h", kmh)
}

/// Elevation gain rounded to the nearest meter.
pub fn format_elevation(meters: f64) -> String {
    if meters == 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.0} m", meters.round())
}

/// ISO 8601 timestamp as `14th June 2025`; empty when unparseable.
pub fn format_date(iso: &str) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(iso) else {
        return String::new();
    };
    let day = date.day();
    format!("{}{} {}", day, day_suffix(day), date.format("%B %Y"))
}

fn day_suffix(day: u32) -> &'static str {
    if (4..=20).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Formatted metrics for one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityMeta {
    pub distance: String,
    pub time: String,
    pub speed: String,
    pub elevation: String,
}

impl ActivityMeta {
    pub fn of(activity: &Activity) -> Self {
        let distance = activity.distance.unwrap_or(0.0);
        let moving_time = activity.moving_time.unwrap_or(0);
        Self {
            distance: format_distance(distance),
            time: format_duration(moving_time),
            speed: format_speed(distance, moving_time),
            elevation: format_elevation(activity.total_elevation_gain.unwrap_or(0.0)),
        }
    }
}
