//! Catalog query coordinator.
//!
//! Turns list-screen intents into backend requests and folds the responses
//! into one consistent [`ResultSet`](crate::catalog::ResultSet):
//!
//! - `set_search_term`: debounced; only the last text typed inside the quiet
//!   window is fetched
//! - `set_sort` / `clear_sort`: immediate, replaces the results
//! - `request_next_page`: appends the next page; suppressed while a fetch is
//!   in flight
//! - `initial_load`: page 0 of the default query, once
//!
//! Last intent wins: every request is tagged with a generation and a request
//! id, and responses that no longer match are dropped on arrival. Failed
//! fetches are not retried.
//!
//! State per query identity:
//!
//! ```text
//! Idle -> LoadingInitial -> Ready <-> LoadingMore
//!              any -> Error -> LoadingInitial (next search/sort/refresh)
//! ```

mod debounce;
mod query;
mod types;

pub use debounce::Debouncer;
pub use query::QueryCoordinator;
pub use types::*;
