// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregate;
pub mod filter;
pub mod session;
pub mod snapshot;
pub mod strava;

pub use aggregate::fetch_all_pages;
pub use filter::{filter_and_sort, TERMINUS_KEYWORD};
pub use session::{ActivityCache, StoredTokens, TokenStore};
pub use snapshot::{write_snapshot, SnapshotJob, SnapshotReport};
pub use strava::{ActivityWindow, StravaClient, TokenResponse};
