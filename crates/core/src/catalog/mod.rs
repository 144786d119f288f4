//! Comic catalog - album records, sorting and the paged-listing abstraction.
//!
//! Every list screen (public catalog, admin BD list, member list, available
//! BDs) is a skip/limit listing plus a count keyed by search text. The
//! [`PagedSource`] trait captures that shape so one coordinator drives them all.

mod types;

pub use types::*;

use async_trait::async_trait;

use crate::client::ApiError;

/// A remote listing that can be fetched page by page.
#[async_trait]
pub trait PagedSource: Send + Sync + 'static {
    /// Record type of the listing.
    type Item: Clone + Send + Sync + 'static;
    /// Sortable columns of the listing.
    type Field: SortKey;

    /// Fetch one page (`skip = page * page_size`, `limit = page_size`).
    async fn list(&self, request: &PageRequest<Self::Field>) -> Result<Vec<Self::Item>, ApiError>;

    /// Total number of records matching `search`, independent of sort and
    /// pagination.
    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError>;

    /// Short name used in logs and metrics labels.
    fn name(&self) -> &'static str;
}

/// A page together with the count for its search text.
#[derive(Debug, Clone)]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Fetch a page and its count concurrently. Both must succeed.
pub async fn fetch_page<S: PagedSource + ?Sized>(
    source: &S,
    request: &PageRequest<S::Field>,
) -> Result<FetchedPage<S::Item>, ApiError> {
    let search = request.identity.effective_search();
    let (items, total) = futures::try_join!(source.list(request), source.count(search))?;
    Ok(FetchedPage { items, total })
}
