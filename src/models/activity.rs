// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity record as listed by `/athlete/activities`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One activity as returned by Strava.
///
/// Only the fields the pipeline and the dashboard look at are typed; every
/// other field Strava sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title; missing or null reads as empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-text description; written back as `null` when unset
    #[serde(default)]
    pub description: Option<String>,
    /// Start date/time (ISO 8601, UTC); missing or null reads as empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    /// Distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_time: Option<u64>,
    /// Elevation gain in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elevation_gain: Option<f64>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Activity {
    /// Minimal activity, mostly for tests and fixtures.
    pub fn new(id: u64, name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            start_date: start_date.into(),
            distance: None,
            moving_time: None,
            total_elevation_gain: None,
            extra: Map::new(),
        }
    }

    /// Public Strava page for this activity.
    pub fn strava_url(&self) -> String {
        format!("https://www.strava.com/activities/{}", self.id)
    }
}
