//! Types for the catalog query coordinator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::QueryIdentity;

/// Tunables of one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Entries per page (`limit`).
    pub page_size: u32,
    /// Quiet window after the last keystroke before a search is sent.
    pub debounce: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            debounce: Duration::from_millis(300),
        }
    }
}

/// Loading state of the current query identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    /// Page 0 of a new identity is in flight; the result set is empty.
    LoadingInitial,
    /// Last fetch applied.
    Ready,
    /// A following page is in flight; loaded items stay visible.
    LoadingMore,
    /// Last authoritative fetch failed.
    Error,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::LoadingInitial | LoadState::LoadingMore)
    }
}

/// What triggered a fetch. Used for logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    Search,
    Sort,
    Refresh,
    NextPage,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Initial => "initial",
            FetchKind::Search => "search",
            FetchKind::Sort => "sort",
            FetchKind::Refresh => "refresh",
            FetchKind::NextPage => "next_page",
        }
    }
}

/// Identifies an issued request when its response comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag<F> {
    /// Monotonic per coordinator.
    pub request_id: u64,
    /// Bumped on every replace (`append = false`) intent.
    pub generation: u64,
    pub identity: QueryIdentity<F>,
    pub page: u32,
    pub append: bool,
}

/// Error flag shown by the presentation layer until dismissed or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub message: String,
    /// True when a following-page fetch failed and loaded items were kept.
    pub append: bool,
}

/// Outcome of one processed coordinator event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorUpdate {
    /// The debounce window elapsed and page 0 of the new search was requested.
    SearchFired { search_term: String },
    /// A page was applied to the result set.
    Applied {
        page: u32,
        append: bool,
        received: usize,
    },
    /// A response arrived for a superseded request and was dropped.
    Discarded { request_id: u64, page: u32 },
    /// The authoritative fetch failed.
    Failed {
        page: u32,
        append: bool,
        message: String,
    },
}
