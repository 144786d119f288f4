//! Mock paged catalog source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{
    effective_search, CatalogEntry, PageRequest, PagedSource, SortField, SortOrder,
};
use crate::client::ApiError;

/// Mock implementation of [`PagedSource`] over an in-memory catalog.
///
/// Provides controllable behavior for testing:
/// - Filter, sort and paginate a configured list of entries
/// - Record every list and count call for assertions
/// - Simulate failures and per-search response delays
///
/// # Example
///
/// ```rust,ignore
/// use bdtheque_core::testing::{MockPagedSource, fixtures};
///
/// let source = MockPagedSource::with_entries(fixtures::catalog(45));
///
/// // The "x" search answers slowly, everything else immediately
/// source.set_delay_for("x", Duration::from_secs(1)).await;
///
/// // The next list call fails
/// source.set_next_error("backend down").await;
///
/// assert_eq!(source.list_call_count().await, 0);
/// ```
pub struct MockPagedSource {
    /// Backing catalog.
    entries: Arc<RwLock<Vec<CatalogEntry>>>,
    /// Recorded list requests.
    list_calls: Arc<RwLock<Vec<PageRequest<SortField>>>>,
    /// Recorded count calls (effective search text).
    count_calls: Arc<RwLock<Vec<Option<String>>>>,
    /// If set, the next list call fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
    /// Response delay per effective search text ("" for no search).
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Delay for searches without a specific entry.
    default_delay: Arc<RwLock<Duration>>,
    /// Return every match from `skip` on, ignoring `limit`.
    ignore_limit: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for MockPagedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPagedSource")
            .field("entries", &"<entries>")
            .field("list_calls", &"<list_calls>")
            .field("count_calls", &"<count_calls>")
            .field("next_error", &"<next_error>")
            .field("delays", &"<delays>")
            .finish()
    }
}

impl Default for MockPagedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPagedSource {
    /// Create a mock source with an empty catalog.
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    /// Create a mock source over the given entries.
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            list_calls: Arc::new(RwLock::new(Vec::new())),
            count_calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delays: Arc::new(RwLock::new(HashMap::new())),
            default_delay: Arc::new(RwLock::new(Duration::ZERO)),
            ignore_limit: Arc::new(RwLock::new(false)),
        }
    }

    /// Replace the backing catalog.
    pub async fn set_entries(&self, entries: Vec<CatalogEntry>) {
        *self.entries.write().await = entries;
    }

    /// Get recorded list requests.
    pub async fn list_calls(&self) -> Vec<PageRequest<SortField>> {
        self.list_calls.read().await.clone()
    }

    /// Get the number of list requests made.
    pub async fn list_call_count(&self) -> usize {
        self.list_calls.read().await.len()
    }

    /// Get recorded count calls.
    pub async fn count_calls(&self) -> Vec<Option<String>> {
        self.count_calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.list_calls.write().await.clear();
        self.count_calls.write().await.clear();
    }

    /// Configure the next list call to fail.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Delay list responses for one search text.
    pub async fn set_delay_for(&self, search: &str, delay: Duration) {
        let key = effective_search(search).unwrap_or_default().to_string();
        self.delays.write().await.insert(key, delay);
    }

    /// Delay list responses for every other search text.
    pub async fn set_default_delay(&self, delay: Duration) {
        *self.default_delay.write().await = delay;
    }

    /// Misbehave like a backend that ignores `limit`.
    pub async fn set_ignore_limit(&self, ignore: bool) {
        *self.ignore_limit.write().await = ignore;
    }

    async fn delay_for(&self, search: Option<&str>) -> Duration {
        let key = search.unwrap_or_default();
        match self.delays.read().await.get(key) {
            Some(delay) => *delay,
            None => *self.default_delay.read().await,
        }
    }

    async fn matching(&self, search: Option<&str>) -> Vec<CatalogEntry> {
        let entries = self.entries.read().await;
        match search {
            None => entries.clone(),
            Some(term) => {
                let term = term.to_lowercase();
                entries
                    .iter()
                    .filter(|e| matches_search(e, &term))
                    .cloned()
                    .collect()
            }
        }
    }
}

fn matches_search(entry: &CatalogEntry, term_lower: &str) -> bool {
    [
        Some(entry.cote.as_str()),
        entry.titreserie.as_deref(),
        entry.titrealbum.as_deref(),
        entry.scenariste.as_deref(),
        entry.dessinateur.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(term_lower))
}

fn sort_value(entry: &CatalogEntry, field: SortField) -> Option<&str> {
    match field {
        SortField::Cote => Some(entry.cote.as_str()),
        SortField::TitreSerie => entry.titreserie.as_deref(),
        SortField::TitreAlbum => entry.titrealbum.as_deref(),
        SortField::NumTome => entry.numtome.as_deref(),
        SortField::Scenariste => entry.scenariste.as_deref(),
        SortField::Dessinateur => entry.dessinateur.as_deref(),
        SortField::Editeur => entry.editeur.as_deref(),
        SortField::Collection => entry.collection.as_deref(),
        SortField::Genre => entry.genre.as_deref(),
    }
}

#[async_trait]
impl PagedSource for MockPagedSource {
    type Item = CatalogEntry;
    type Field = SortField;

    async fn list(&self, request: &PageRequest<SortField>) -> Result<Vec<CatalogEntry>, ApiError> {
        self.list_calls.write().await.push(request.clone());
        let error = self.next_error.write().await.take();

        let search = request.identity.effective_search();
        let delay = self.delay_for(search).await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = error {
            return Err(ApiError::ApiError {
                status: 503,
                message,
            });
        }

        let mut matches = self.matching(search).await;
        if let Some(sort) = &request.identity.sort {
            matches.sort_by(|a, b| {
                let ord = sort_value(a, sort.field).cmp(&sort_value(b, sort.field));
                match sort.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = usize::try_from(request.skip()).unwrap_or(usize::MAX);
        let take = if *self.ignore_limit.read().await {
            usize::MAX
        } else {
            request.limit() as usize
        };
        Ok(matches.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError> {
        let search = search.and_then(effective_search);
        self.count_calls
            .write()
            .await
            .push(search.map(str::to_string));
        Ok(self.matching(search).await.len() as u64)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
