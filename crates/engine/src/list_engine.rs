//! One list view wired end to end: debounced input, coordinator, isolator.

use std::sync::{Arc, Mutex, PoisonError};

use incr_list_core::{Query, Viewport};
use tokio::task::{JoinHandle, JoinSet};

use crate::{
    debounced, DebouncedReceiver, DebouncedSender, EngineConfig, EngineError, FetchOutcome,
    ListErrorIsolator, ListState, ListStatus, PageFetchCoordinator, PageFetcher, RenderError,
    RenderOutcome,
};

/// Runs a list view on the current tokio runtime.
///
/// Raw queries go in through [`ListEngine::submit_query`]; once a query has
/// been stable for the configured debounce interval and differs from the
/// active one, a new generation starts. Dropping the engine cancels any
/// pending query and aborts fetches still in flight.
pub struct ListEngine<F: PageFetcher + 'static> {
    coordinator: Arc<PageFetchCoordinator<F>>,
    queries: DebouncedSender<Query>,
    isolator: Mutex<ListErrorIsolator>,
    driver: JoinHandle<()>,
}

impl<F: PageFetcher + 'static> ListEngine<F> {
    /// Must be called from within a tokio runtime.
    pub fn spawn(fetcher: F, config: &EngineConfig) -> Result<Self, EngineError> {
        let coordinator = Arc::new(
            PageFetchCoordinator::new(fetcher, config.page_size()?)
                .with_fetch_timeout(config.fetch_timeout()),
        );
        Ok(Self::from_coordinator(coordinator, config))
    }

    /// Same as [`Self::spawn`] for a coordinator the caller already set up
    /// (for example with a sanitizer).
    #[must_use]
    pub fn from_coordinator(coordinator: Arc<PageFetchCoordinator<F>>, config: &EngineConfig) -> Self {
        let (queries, stabilized) = debounced(config.debounce());
        let driver = tokio::spawn(drive(Arc::clone(&coordinator), stabilized));
        tracing::debug!(debounce_ms = config.debounce_ms, "list engine started");
        Self { coordinator, queries, isolator: Mutex::new(ListErrorIsolator::new()), driver }
    }

    /// Feeds raw filter input; it is debounced before anything is fetched.
    pub fn submit_query(&self, query: Query) -> Result<(), EngineError> {
        self.queries.send(query)
    }

    /// Starts a new generation for `query` right away, even if it is the
    /// active query, and waits for its first page.
    pub async fn refresh(&self, query: Query) -> FetchOutcome {
        self.coordinator.start_generation(query).await
    }

    /// Next page of the current generation; `None` when there is nothing to do.
    pub async fn load_more(&self) -> Option<FetchOutcome> {
        self.coordinator.load_more().await
    }

    #[must_use]
    pub fn snapshot(&self) -> ListState<F::Item> {
        self.coordinator.snapshot()
    }

    #[must_use]
    pub fn status(&self) -> ListStatus {
        self.coordinator.status()
    }

    #[must_use]
    pub const fn coordinator(&self) -> &Arc<PageFetchCoordinator<F>> {
        &self.coordinator
    }

    /// Renders the rows inside `viewport` through the error isolator.
    ///
    /// The windowed rows are cloned out first, so `render_row` may read list
    /// state. It must not call back into [`Self::render_visible`] or
    /// [`Self::try_again`], which share the isolator lock.
    pub fn render_visible<R>(
        &self,
        viewport: &Viewport,
        render_row: impl Fn(&F::Item, usize) -> Result<R, RenderError>,
    ) -> RenderOutcome<R> {
        let visible = self.coordinator.visible_rows(viewport);
        self.isolator.lock().unwrap_or_else(PoisonError::into_inner).render_rows(&visible.rows, render_row)
    }

    /// Clears a render fault; the next [`Self::render_visible`] retries.
    pub fn try_again(&self) {
        self.isolator.lock().unwrap_or_else(PoisonError::into_inner).try_again();
    }

    /// Stops the engine. A query still waiting out its debounce is dropped.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl<F: PageFetcher + 'static> Drop for ListEngine<F> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive<F: PageFetcher + 'static>(
    coordinator: Arc<PageFetchCoordinator<F>>,
    mut stabilized: DebouncedReceiver<Query>,
) {
    let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
    loop {
        tokio::select! {
            incoming = stabilized.recv() => {
                let Some(query) = incoming else {
                    break;
                };
                let unchanged =
                    coordinator.with_state(|state| state.query.as_ref() == Some(&query));
                if unchanged {
                    tracing::debug!(search = %query.search, "query unchanged, not refetching");
                    continue;
                }
                let ticket = coordinator.begin_generation(query);
                let coordinator = Arc::clone(&coordinator);
                in_flight.spawn(async move { coordinator.run(ticket).await });
            },
            Some(joined) = in_flight.join_next() => {
                match joined {
                    Ok(outcome) => tracing::debug!(?outcome, "initial page fetch finished"),
                    Err(err) if err.is_panic() => {
                        tracing::error!(error = %err, "page fetch task panicked");
                    },
                    Err(_) => {},
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use incr_list_core::FALLBACK_MESSAGE;

    use super::*;
    use crate::test_support::{job_board, Job, RecordingFetcher};

    const SETTLE: Duration = Duration::from_secs(1);

    fn config() -> EngineConfig {
        EngineConfig { row_height: 50.0, overscan: 1, ..EngineConfig::default() }
    }

    fn search(text: &str) -> Query {
        Query::new().with_search(text)
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_fetches_once_for_final_query() {
        let fetcher = Arc::new(RecordingFetcher::new(job_board()));
        let engine = ListEngine::spawn(Arc::clone(&fetcher), &config()).expect("engine");

        for text in ["e", "en", "eng", "engi", "engineer"] {
            engine.submit_query(search(text)).expect("submit");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(SETTLE).await;

        assert_eq!(fetcher.calls(), vec![(search("engineer"), 1)]);
        let state = engine.snapshot();
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.total, 45);
        assert!(state.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn resubmitting_active_query_does_not_refetch() {
        let fetcher = Arc::new(RecordingFetcher::new(job_board()));
        let engine = ListEngine::spawn(Arc::clone(&fetcher), &config()).expect("engine");

        engine.submit_query(search("engineer")).expect("submit");
        tokio::time::sleep(SETTLE).await;
        let generation = engine.coordinator().current_generation();

        engine.submit_query(search("engineer")).expect("submit");
        tokio::time::sleep(SETTLE).await;

        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(engine.coordinator().current_generation(), generation);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_query_starts_new_generation() {
        let fetcher = Arc::new(RecordingFetcher::new(job_board()));
        let engine = ListEngine::spawn(Arc::clone(&fetcher), &config()).expect("engine");

        engine.submit_query(search("engineer")).expect("submit");
        tokio::time::sleep(SETTLE).await;
        engine.submit_query(search("designer")).expect("submit");
        tokio::time::sleep(SETTLE).await;

        let state = engine.snapshot();
        assert_eq!(state.generation.value(), 2);
        assert_eq!(state.items.len(), 10);
        assert!(state.items.iter().all(|job: &Job| job.title.contains("designer")));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_always_refetches_and_load_more_appends() {
        let fetcher = Arc::new(RecordingFetcher::new(job_board()));
        let engine = ListEngine::spawn(Arc::clone(&fetcher), &config()).expect("engine");

        engine.refresh(search("engineer")).await;
        engine.refresh(search("engineer")).await;
        assert_eq!(fetcher.calls().len(), 2);
        assert_eq!(engine.coordinator().current_generation().value(), 2);

        let outcome = engine.load_more().await.expect("second page");
        assert!(matches!(outcome, FetchOutcome::Applied { page_number: 2, item_count: 20, .. }));
        assert_eq!(engine.snapshot().items.len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_query() {
        let fetcher = Arc::new(RecordingFetcher::new(job_board()));
        let engine = ListEngine::spawn(Arc::clone(&fetcher), &config()).expect("engine");

        engine.submit_query(search("engineer")).expect("submit");
        tokio::time::sleep(Duration::from_millis(100)).await;
        engine.shutdown();
        tokio::time::sleep(SETTLE).await;

        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn render_fault_falls_back_until_try_again() {
        let engine = ListEngine::spawn(job_board(), &config()).expect("engine");
        engine.refresh(search("engineer")).await;
        let viewport = config().viewport(500.0, 200.0).expect("viewport");

        let ok = engine.render_visible(&viewport, |job, _| Ok(job.id));
        let RenderOutcome::Rows(rows) = ok else {
            panic!("expected rows, got {ok:?}");
        };
        let indices: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![9, 10, 11, 12, 13, 14]);

        let broken = engine.render_visible(&viewport, |job, i| {
            if i == 12 { Err(RenderError::new("bad row")) } else { Ok(job.id) }
        });
        let RenderOutcome::Fallback(fallback) = broken else {
            panic!("expected fallback");
        };
        assert_eq!(fallback.message, FALLBACK_MESSAGE);

        assert!(engine.render_visible(&viewport, |job, _| Ok(job.id)).is_fallback());
        engine.try_again();
        assert!(matches!(
            engine.render_visible(&viewport, |job, _| Ok(job.id)),
            RenderOutcome::Rows(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn render_row_may_read_list_state() {
        let engine = ListEngine::spawn(job_board(), &config()).expect("engine");
        engine.refresh(search("engineer")).await;
        let viewport = config().viewport(0.0, 100.0).expect("viewport");

        let out = engine.render_visible(&viewport, |job, _| Ok((job.id, engine.snapshot().total)));
        let RenderOutcome::Rows(rows) = out else {
            panic!("expected rows, got {out:?}");
        };
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|(_, (_, total))| *total == 45));
        assert!(matches!(engine.status(), ListStatus::Ready { has_more: true, .. }));
    }
}
