//! The query coordinator itself.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::types::{
    CoordinatorConfig, CoordinatorUpdate, FetchError, FetchKind, LoadState, RequestTag,
};
use crate::catalog::{
    fetch_page, FetchedPage, PageRequest, PagedSource, QueryIdentity, ResultSet, SortOrder,
    SortSpec,
};
use crate::client::ApiError;
use crate::metrics::{
    DEBOUNCES_SUPERSEDED, FETCHES_APPLIED, FETCHES_ISSUED, FETCH_FAILURES, STALE_RESPONSES,
};

enum Event<S: PagedSource> {
    DebounceElapsed {
        ticket: u64,
        search_term: String,
    },
    Fetched {
        tag: RequestTag<S::Field>,
        result: Result<FetchedPage<S::Item>, ApiError>,
    },
}

/// Owns the search/sort/pagination state of one list screen.
///
/// All methods take `&mut self`: the owning task is the only writer. Fetches
/// and debounce timers run as spawned tasks and report back through a
/// channel drained by [`next_update`](Self::next_update) or
/// [`process_pending`](Self::process_pending). A response is applied only if
/// it belongs to the current generation and is the authoritative in-flight
/// request; anything else is discarded on arrival.
pub struct QueryCoordinator<S: PagedSource> {
    source: Arc<S>,
    config: CoordinatorConfig,
    identity: QueryIdentity<S::Field>,
    /// Latest typed text, possibly not yet applied to `identity`.
    search_input: String,
    results: ResultSet<S::Item>,
    state: LoadState,
    error: Option<FetchError>,
    generation: u64,
    next_request_id: u64,
    in_flight: Option<RequestTag<S::Field>>,
    debouncer: Debouncer,
    events_tx: mpsc::UnboundedSender<Event<S>>,
    events_rx: mpsc::UnboundedReceiver<Event<S>>,
}

impl<S: PagedSource> QueryCoordinator<S> {
    pub fn new(source: Arc<S>, config: CoordinatorConfig) -> Self {
        let config = CoordinatorConfig {
            page_size: config.page_size.max(1),
            ..config
        };
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            source,
            debouncer: Debouncer::new(config.debounce),
            config,
            identity: QueryIdentity::default(),
            search_input: String::new(),
            results: ResultSet::default(),
            state: LoadState::Idle,
            error: None,
            generation: 0,
            next_request_id: 0,
            in_flight: None,
            events_tx,
            events_rx,
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Load page 0 of the default identity. Only valid once, before any
    /// other intent.
    pub fn initial_load(&mut self) -> bool {
        if self.state != LoadState::Idle {
            debug!(
                "[{}] initial_load ignored in state {:?}",
                self.source.name(),
                self.state
            );
            return false;
        }
        self.start_fresh(QueryIdentity::default(), FetchKind::Initial);
        true
    }

    /// Record typed search text. The fetch happens once the input has been
    /// quiet for the debounce window.
    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
        if self.debouncer.cancel() {
            DEBOUNCES_SUPERSEDED
                .with_label_values(&[self.source.name()])
                .inc();
        }
        let tx = self.events_tx.clone();
        let search_term = self.search_input.clone();
        self.debouncer.schedule(move |ticket| {
            let _ = tx.send(Event::DebounceElapsed {
                ticket,
                search_term,
            });
        });
    }

    /// Order by `field`. Applies immediately together with any typed text
    /// still waiting for its debounce window.
    pub fn set_sort(&mut self, field: S::Field, order: SortOrder) {
        self.apply_sort(Some(SortSpec::new(field, order)));
    }

    /// Back to the backend's natural order.
    pub fn clear_sort(&mut self) {
        self.apply_sort(None);
    }

    /// Re-run the current identity from page 0, e.g. after an admin edit or
    /// to recover from an error.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        let identity = QueryIdentity::new(self.search_input.clone(), self.identity.sort.clone());
        self.start_fresh(identity, FetchKind::Refresh);
    }

    /// Request the page after the last one applied.
    ///
    /// A no-op returning `false` when there is nothing more to load or a
    /// fetch is already in flight; calls are never queued.
    pub fn request_next_page(&mut self) -> bool {
        if self.in_flight.is_some() {
            debug!("[{}] next page suppressed: fetch in flight", self.source.name());
            return false;
        }
        if !self.results.has_more || !matches!(self.state, LoadState::Ready | LoadState::Error) {
            return false;
        }

        self.state = LoadState::LoadingMore;
        let page = self.results.page_cursor + 1;
        self.issue(page, true, FetchKind::NextPage);
        true
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // =========================================================================
    // Event loop side
    // =========================================================================

    /// Wait for the next event and apply it.
    ///
    /// Returns `None` once nothing authoritative is pending: no debounce
    /// scheduled, no fetch in flight and no delivered event left.
    pub async fn next_update(&mut self) -> Option<CoordinatorUpdate> {
        loop {
            let event = if self.is_busy() {
                self.events_rx.recv().await?
            } else {
                self.events_rx.try_recv().ok()?
            };
            if let Some(update) = self.handle_event(event) {
                return Some(update);
            }
        }
    }

    /// Apply every event already delivered, without waiting.
    pub fn process_pending(&mut self) -> Vec<CoordinatorUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(update) = self.handle_event(event) {
                updates.push(update);
            }
        }
        updates
    }

    /// Drive the coordinator until nothing is pending.
    pub async fn settle(&mut self) -> Vec<CoordinatorUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn items(&self) -> &[S::Item] {
        &self.results.items
    }

    pub fn results(&self) -> &ResultSet<S::Item> {
        &self.results
    }

    pub fn total_count(&self) -> u64 {
        self.results.total_count
    }

    pub fn has_more(&self) -> bool {
        self.results.has_more
    }

    pub fn page_cursor(&self) -> u32 {
        self.results.page_cursor
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Identity the visible results belong to.
    pub fn identity(&self) -> &QueryIdentity<S::Field> {
        &self.identity
    }

    /// Latest typed text, applied or not.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.debouncer.is_pending()
    }

    fn apply_sort(&mut self, sort: Option<SortSpec<S::Field>>) {
        // Typed text waiting for its window goes out with the sort change.
        self.debouncer.cancel();
        let identity = QueryIdentity::new(self.search_input.clone(), sort);
        self.start_fresh(identity, FetchKind::Sort);
    }

    fn start_fresh(&mut self, identity: QueryIdentity<S::Field>, kind: FetchKind) {
        self.generation += 1;
        self.identity = identity;
        self.results.clear();
        self.error = None;
        self.state = LoadState::LoadingInitial;
        self.issue(0, false, kind);
    }

    fn issue(&mut self, page: u32, append: bool, kind: FetchKind) {
        self.next_request_id += 1;
        let tag = RequestTag {
            request_id: self.next_request_id,
            generation: self.generation,
            identity: self.identity.clone(),
            page,
            append,
        };
        let request = PageRequest::new(self.identity.clone(), page, self.config.page_size);

        debug!(
            "[{}] fetch #{} ({}): page={}, search={:?}, generation={}",
            self.source.name(),
            tag.request_id,
            kind.as_str(),
            page,
            request.identity.effective_search(),
            tag.generation
        );
        FETCHES_ISSUED
            .with_label_values(&[self.source.name(), kind.as_str()])
            .inc();

        self.in_flight = Some(tag.clone());
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = fetch_page(source.as_ref(), &request).await;
            // The coordinator may be gone; its screen was closed.
            let _ = tx.send(Event::Fetched { tag, result });
        });
    }

    fn handle_event(&mut self, event: Event<S>) -> Option<CoordinatorUpdate> {
        match event {
            Event::DebounceElapsed {
                ticket,
                search_term,
            } => {
                if !self.debouncer.fired(ticket) {
                    return None;
                }
                info!("[{}] search: {:?}", self.source.name(), search_term);
                let identity = QueryIdentity::new(search_term.clone(), self.identity.sort.clone());
                self.start_fresh(identity, FetchKind::Search);
                Some(CoordinatorUpdate::SearchFired { search_term })
            }
            Event::Fetched { tag, result } => Some(self.apply_response(tag, result)),
        }
    }

    fn apply_response(
        &mut self,
        tag: RequestTag<S::Field>,
        result: Result<FetchedPage<S::Item>, ApiError>,
    ) -> CoordinatorUpdate {
        let authoritative = tag.generation == self.generation
            && self.in_flight.as_ref().map(|t| t.request_id) == Some(tag.request_id);
        if !authoritative {
            warn!(
                "[{}] discarding stale response #{} (generation {} vs {})",
                self.source.name(),
                tag.request_id,
                tag.generation,
                self.generation
            );
            STALE_RESPONSES
                .with_label_values(&[self.source.name()])
                .inc();
            return CoordinatorUpdate::Discarded {
                request_id: tag.request_id,
                page: tag.page,
            };
        }
        self.in_flight = None;

        match result {
            Ok(FetchedPage { mut items, total }) => {
                items.truncate(self.config.page_size as usize);
                let received = items.len();
                self.results
                    .apply_page(tag.page, self.config.page_size, items, total, tag.append);
                self.state = LoadState::Ready;
                self.error = None;
                FETCHES_APPLIED
                    .with_label_values(&[self.source.name()])
                    .inc();
                debug!(
                    "[{}] applied page {}: {} items, {} loaded of {}, has_more={}",
                    self.source.name(),
                    tag.page,
                    received,
                    self.results.len(),
                    self.results.total_count,
                    self.results.has_more
                );
                CoordinatorUpdate::Applied {
                    page: tag.page,
                    append: tag.append,
                    received,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    "[{}] fetch of page {} failed: {}",
                    self.source.name(),
                    tag.page,
                    message
                );
                FETCH_FAILURES
                    .with_label_values(&[self.source.name(), if tag.append { "true" } else { "false" }])
                    .inc();
                if !tag.append {
                    self.results.clear();
                }
                self.state = LoadState::Error;
                self.error = Some(FetchError {
                    message: message.clone(),
                    append: tag.append,
                });
                CoordinatorUpdate::Failed {
                    page: tag.page,
                    append: tag.append,
                    message,
                }
            }
        }
    }
}
