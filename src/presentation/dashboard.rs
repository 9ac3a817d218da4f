// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard state: what the page shows after loading `/activities`, which
//! view is active, and how the table is sorted.
//!
//! The dashboard owns all of its state. The only thing that outlives a page
//! load is the view preference, which goes through a [`PreferenceStore`]
//! supplied by the host.

use crate::models::Activity;
use crate::presentation::cards::render_cards;
use crate::presentation::table::{SortColumn, SortState, TableModel};
use maud::{html, Markup, DOCTYPE};
use std::collections::HashMap;

/// Preference key for the persisted view.
pub const VIEW_MODE_KEY: &str = "viewMode";

/// Where the login affordance points.
pub const LOGIN_PATH: &str = "/login";

/// Where the view toggle points.
pub const TOGGLE_VIEW_PATH: &str = "/view/toggle";

/// Shown with the login affordance when the athlete has no matching activities.
pub const EMPTY_MESSAGE: &str = "No activities found for the Tube Cycling Challenge.";

/// Shown when the activity list could not be loaded at all.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading activities. Please try again later.";

/// Card or table presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    /// Only an explicit `"table"` selects the table.
    pub fn from_preference(value: Option<&str>) -> Self {
        match value {
            Some("table") => ViewMode::Table,
            _ => ViewMode::Card,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Card => "card",
            ViewMode::Table => "table",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Card => ViewMode::Table,
            ViewMode::Table => ViewMode::Card,
        }
    }

    /// Label of the control that switches away from this view.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ViewMode::Card => "See Tabular View",
            ViewMode::Table => "See Card View",
        }
    }
}

/// Client-local key/value persistence (browser local storage, a cookie jar, ...).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory preferences.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Result of requesting the activity list.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 401 or any other non-success status.
    Unauthenticated,
    Loaded(Vec<Activity>),
    /// Transport failure or unreadable body.
    Failed(String),
}

impl FetchOutcome {
    /// Classify an HTTP response from `/activities`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if !(200..300).contains(&status) {
            return FetchOutcome::Unauthenticated;
        }
        match serde_json::from_slice(body) {
            Ok(activities) => FetchOutcome::Loaded(activities),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable activity list");
                FetchOutcome::Failed(LOAD_ERROR_MESSAGE.to_string())
            }
        }
    }
}

/// Which top-level screen the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    LoginRequired,
    Empty,
    Failed(String),
    Ready,
}

/// The rendering component. Every render is rebuilt from this state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    activities: Vec<Activity>,
    screen: Screen,
    view: ViewMode,
    sort: SortState,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            activities: Vec::new(),
            screen: Screen::Loading,
            view: ViewMode::Card,
            sort: SortState::default(),
        }
    }

    /// Apply a fetch result; the initial view comes from the stored preference.
    pub fn load(&mut self, outcome: FetchOutcome, prefs: &dyn PreferenceStore) {
        match outcome {
            FetchOutcome::Unauthenticated => {
                self.activities.clear();
                self.screen = Screen::LoginRequired;
            }
            FetchOutcome::Failed(message) => {
                self.activities.clear();
                self.screen = Screen::Failed(message);
            }
            FetchOutcome::Loaded(activities) if activities.is_empty() => {
                self.activities = activities;
                self.screen = Screen::Empty;
            }
            FetchOutcome::Loaded(activities) => {
                self.activities = activities;
                self.restore_view(prefs);
                self.screen = Screen::Ready;
            }
        }
    }

    /// Take the view from the stored preference.
    pub fn restore_view(&mut self, prefs: &dyn PreferenceStore) {
        self.view = ViewMode::from_preference(prefs.get(VIEW_MODE_KEY).as_deref());
    }

    /// Switch between card and table view and persist the choice.
    pub fn toggle_view(&mut self, prefs: &mut dyn PreferenceStore) {
        self.view = self.view.toggled();
        prefs.set(VIEW_MODE_KEY, self.view.as_str());
    }

    pub fn click_sort(&mut self, column: SortColumn) {
        self.sort.click(column);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn login_visible(&self) -> bool {
        matches!(self.screen, Screen::LoginRequired | Screen::Empty)
    }

    pub fn toggle_visible(&self) -> bool {
        self.screen == Screen::Ready
    }

    pub fn cards_visible(&self) -> bool {
        self.screen == Screen::Ready && self.view == ViewMode::Card
    }

    pub fn table_visible(&self) -> bool {
        self.screen == Screen::Ready && self.view == ViewMode::Table
    }

    pub fn message(&self) -> Option<&str> {
        match &self.screen {
            Screen::Empty => Some(EMPTY_MESSAGE),
            Screen::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn table(&self) -> TableModel {
        TableModel::build(&self.activities, self.sort)
    }

    /// Render the page body for the current state.
    pub fn render(&self) -> Markup {
        html! {
            @if self.login_visible() {
                a class="header-login" href=(LOGIN_PATH) { "Connect with Strava" }
            }
            @if self.toggle_visible() {
                div class="view-toggle" {
                    a id="toggle-table-view" href=(TOGGLE_VIEW_PATH) { (self.view.toggle_label()) }
                }
            }
            @if let Some(message) = self.message() {
                p class="message" { (message) }
            }
            @if self.cards_visible() {
                div id="activities" { (render_cards(&self.activities)) }
            }
            @if self.table_visible() {
                div id="table-view" { (self.table().render()) }
            }
        }
    }

    /// Render a complete HTML document.
    pub fn render_page(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { "Terminus Tracker" }
                }
                body { (self.render()) }
            }
        }
    }
}
