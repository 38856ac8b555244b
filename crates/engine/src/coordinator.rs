//! Generation-scoped pagination.
//!
//! Every fetch is described by a [`FetchTicket`] issued synchronously while the
//! state lock is held. The network call happens without the lock; on return the
//! ticket is checked against the current generation and the expected next page
//! before anything is applied. A response whose ticket no longer matches is
//! dropped, so a late page from a superseded query can never touch newer state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use incr_list_core::{
    window, FetchError, FetchState, Generation, ListItem, MarkupSanitizer, Page, PageResponse,
    PageSize, Query, Viewport, Window,
};
use serde::Serialize;

use crate::PageFetcher;

/// One fetch request, bound to the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: Generation,
    page_number: u32,
    page_size: PageSize,
    query: Query,
}

impl FetchTicket {
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }
}

/// What happened to one fetch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Applied { generation: Generation, page_number: u32, item_count: usize },
    Failed { generation: Generation, page_number: u32, reason: String },
    /// Discarded without touching state.
    Stale { generation: Generation, page_number: u32, current: Generation },
}

/// Coarse view state derived from [`ListState`], for choosing what to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus {
    /// No query has been started yet.
    Idle,
    /// First page of the current generation is in flight.
    LoadingInitial,
    /// Generation loaded and has no items: render the empty state, not an error.
    Empty,
    /// First page failed; render an empty list with the error and a retry.
    InitialError { reason: String },
    /// Rows are available. `error` is a failed `load_more`; rows stay visible.
    Ready { loading_more: bool, has_more: bool, error: Option<String> },
}

/// Pagination state of the current generation.
#[derive(Debug, Clone, Serialize)]
pub struct ListState<T> {
    pub generation: Generation,
    pub query: Option<Query>,
    /// Concatenation of pages `1..=page_number`, in fetch order.
    pub items: Vec<T>,
    /// Last successfully applied page; 0 until page 1 lands.
    pub page_number: u32,
    pub page_size: u32,
    pub total: u64,
    pub has_more: bool,
    pub fetch_state: FetchState,
    /// Items whose key was already present in this generation.
    pub duplicate_keys: usize,
}

impl<T> ListState<T> {
    fn new(page_size: PageSize) -> Self {
        Self {
            generation: Generation::NONE,
            query: None,
            items: Vec::new(),
            page_number: 0,
            page_size: page_size.get(),
            total: 0,
            has_more: false,
            fetch_state: FetchState::Idle,
            duplicate_keys: 0,
        }
    }

    #[must_use]
    pub const fn loading(&self) -> bool {
        self.fetch_state.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.fetch_state.error()
    }

    #[must_use]
    pub fn status(&self) -> ListStatus {
        if self.query.is_none() {
            return ListStatus::Idle;
        }
        if self.items.is_empty() {
            return match &self.fetch_state {
                FetchState::Failed(reason) => ListStatus::InitialError { reason: reason.clone() },
                FetchState::Loaded => ListStatus::Empty,
                FetchState::Idle | FetchState::Loading => ListStatus::LoadingInitial,
            };
        }
        ListStatus::Ready {
            loading_more: self.loading(),
            has_more: self.has_more,
            error: self.error().map(str::to_owned),
        }
    }
}

/// Rows authorized for rendering by the windower, with their absolute indices.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleRows<T> {
    pub window: Window,
    pub rows: Vec<(usize, T)>,
    pub status: ListStatus,
}

struct Inner<T: ListItem> {
    state: ListState<T>,
    seen_keys: HashSet<T::Key>,
    /// Applied at the next generation; a running generation keeps its size.
    next_page_size: PageSize,
}

/// Owns pagination state for one list view and sequences its fetches.
pub struct PageFetchCoordinator<F: PageFetcher> {
    fetcher: F,
    sanitizer: Option<Arc<dyn MarkupSanitizer>>,
    fetch_timeout: Option<Duration>,
    inner: Mutex<Inner<F::Item>>,
}

impl<F: PageFetcher> PageFetchCoordinator<F> {
    #[must_use]
    pub fn new(fetcher: F, page_size: PageSize) -> Self {
        Self {
            fetcher,
            sanitizer: None,
            fetch_timeout: None,
            inner: Mutex::new(Inner {
                state: ListState::new(page_size),
                seen_keys: HashSet::new(),
                next_page_size: page_size,
            }),
        }
    }

    /// Runs every fetched item through `sanitizer` before it is stored.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn MarkupSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Resolves fetches that take longer than `timeout` to a failure.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    // State is plain data; a panic while holding the lock cannot leave it
    // half-updated in a way later calls would misread.
    fn lock(&self) -> MutexGuard<'_, Inner<F::Item>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current_generation(&self) -> Generation {
        self.lock().state.generation
    }

    /// Page size for generations started after this call.
    pub fn set_page_size(&self, page_size: PageSize) {
        self.lock().next_page_size = page_size;
    }

    /// Starts a new generation for `query` and returns the ticket for its page 1.
    ///
    /// Everything accumulated for the previous generation is discarded here,
    /// synchronously, so the reset is visible before any fetch resolves.
    pub fn begin_generation(&self, query: Query) -> FetchTicket {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let generation = inner.state.generation.next();
        let page_size = inner.next_page_size;

        inner.seen_keys.clear();
        inner.state = ListState {
            generation,
            query: Some(query.clone()),
            has_more: true,
            fetch_state: FetchState::Loading,
            ..ListState::new(page_size)
        };
        tracing::debug!(%generation, search = %query.search, "started generation");

        FetchTicket { generation, page_number: 1, page_size, query }
    }

    /// Ticket for the next page of the current generation.
    ///
    /// `None` while a fetch is in flight, when the server reported no more
    /// pages, or before any generation was started. After a failure the same
    /// page is requested again, so retrying never skips or loses data.
    pub fn begin_load_more(&self) -> Option<FetchTicket> {
        let mut inner = self.lock();
        let state = &mut inner.state;
        let query = state.query.clone()?;
        if state.loading() || !state.has_more {
            return None;
        }
        let page_size = PageSize::new(state.page_size).ok()?;
        state.fetch_state = FetchState::Loading;
        Some(FetchTicket {
            generation: state.generation,
            page_number: state.page_number.saturating_add(1),
            page_size,
            query,
        })
    }

    /// Calls the fetch collaborator for `ticket`, honouring the fetch timeout.
    pub async fn fetch(&self, ticket: &FetchTicket) -> Result<PageResponse<F::Item>, FetchError> {
        let request =
            self.fetcher.fetch_page(&ticket.query, ticket.page_number, ticket.page_size.get());
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or(Err(FetchError::Timeout(limit))),
            None => request.await,
        }
    }

    /// Fetches and applies one ticket.
    pub async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let result = self.fetch(&ticket).await;
        self.apply(&ticket, result)
    }

    /// Applies a fetch result if `ticket` is still the one the state expects.
    pub fn apply(
        &self,
        ticket: &FetchTicket,
        result: Result<PageResponse<F::Item>, FetchError>,
    ) -> FetchOutcome {
        let generation = ticket.generation;
        let page_number = ticket.page_number;

        // Sanitize before taking the lock; stale pages waste the work but never block.
        let result = result.map(|response| {
            let mut page = Page::from_response(page_number, ticket.page_size.get(), response);
            if let Some(sanitizer) = &self.sanitizer {
                for item in &mut page.items {
                    item.sanitize_content(sanitizer.as_ref());
                }
            }
            page
        });

        let mut inner = self.lock();
        let inner = &mut *inner;
        let current = inner.state.generation;
        let expected_page = inner.state.page_number.saturating_add(1);
        if generation != current || page_number != expected_page {
            tracing::debug!(
                %generation,
                %current,
                page_number,
                expected_page,
                "discarding stale page"
            );
            return FetchOutcome::Stale { generation, page_number, current };
        }

        match result {
            Ok(page) => {
                if page.is_first() {
                    inner.state.items.clear();
                    inner.seen_keys.clear();
                }
                let duplicates =
                    page.items.iter().filter(|item| !inner.seen_keys.insert(item.key())).count();
                if duplicates > 0 {
                    tracing::warn!(
                        %generation,
                        page_number,
                        duplicates,
                        "page contains keys already present in this generation"
                    );
                    inner.state.duplicate_keys = inner.state.duplicate_keys.saturating_add(duplicates);
                }

                let item_count = page.items.len();
                inner.state.items.extend(page.items);
                inner.state.total = page.total;
                inner.state.has_more = page.has_more;
                inner.state.page_number = page_number;
                inner.state.fetch_state = FetchState::Loaded;
                tracing::debug!(
                    %generation,
                    page_number,
                    item_count,
                    accumulated = inner.state.items.len(),
                    has_more = page.has_more,
                    "applied page"
                );
                FetchOutcome::Applied { generation, page_number, item_count }
            },
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(%generation, page_number, error = %reason, "page fetch failed");
                inner.state.fetch_state = FetchState::Failed(reason.clone());
                FetchOutcome::Failed { generation, page_number, reason }
            },
        }
    }

    /// Starts a generation for `query` and fetches its first page.
    pub async fn start_generation(&self, query: Query) -> FetchOutcome {
        let ticket = self.begin_generation(query);
        self.run(ticket).await
    }

    /// Fetches the next page; `None` if [`Self::begin_load_more`] declined.
    pub async fn load_more(&self) -> Option<FetchOutcome> {
        let ticket = self.begin_load_more()?;
        Some(self.run(ticket).await)
    }

    #[must_use]
    pub fn snapshot(&self) -> ListState<F::Item> {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn status(&self) -> ListStatus {
        self.lock().state.status()
    }

    /// Runs `f` against the current state without cloning the items.
    pub fn with_state<R>(&self, f: impl FnOnce(&ListState<F::Item>) -> R) -> R {
        f(&self.lock().state)
    }

    /// Clones only the rows inside the window for `viewport`.
    #[must_use]
    pub fn visible_rows(&self, viewport: &Viewport) -> VisibleRows<F::Item> {
        let inner = self.lock();
        let state = &inner.state;
        let window = window(viewport, state.items.len());
        let mut rows = Vec::with_capacity(window.range.len());
        rows.extend(
            window.range.indices().filter_map(|index| state.items.get(index).map(|item| (index, item.clone()))),
        );
        VisibleRows { window, rows, status: state.status() }
    }
}
