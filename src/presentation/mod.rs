// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation layer: card and table views of an activity list.
//!
//! Nothing here performs I/O. Hosts feed in a [`FetchOutcome`] and a
//! [`PreferenceStore`] and get HTML back.

pub mod cards;
pub mod dashboard;
pub mod format;
pub mod table;

pub use dashboard::{Dashboard, FetchOutcome, MemoryPreferences, PreferenceStore, Screen, ViewMode};
pub use table::{SortColumn, SortState, TableModel};
