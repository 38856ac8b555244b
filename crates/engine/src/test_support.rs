//! Fixtures shared by the engine's unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use incr_list_core::{FetchError, ListItem, MarkupSanitizer, PageResponse, Query};
use tokio::sync::Notify;

use crate::{InMemoryFetcher, PageFetcher};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Job {
    pub id: u32,
    pub title: String,
    pub description: String,
}

impl Job {
    pub fn new(id: u32, title: &str) -> Self {
        Self { id, title: title.to_owned(), description: String::new() }
    }
}

impl ListItem for Job {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn sanitize_content(&mut self, sanitizer: &dyn MarkupSanitizer) {
        self.description = sanitizer.sanitize(&self.description);
    }
}

pub(crate) fn jobs(ids: std::ops::RangeInclusive<u32>, title: &str) -> Vec<Job> {
    ids.map(|id| Job::new(id, title)).collect()
}

/// 45 "engineer" jobs followed by 10 "designer" jobs.
pub(crate) fn job_board() -> InMemoryFetcher<Job> {
    let mut all = jobs(1..=45, "Rust engineer");
    all.extend(jobs(100..=109, "Product designer"));
    InMemoryFetcher::new(all, |job, query| {
        job.title.to_lowercase().contains(&query.search.to_lowercase())
    })
}

pub(crate) fn page(items: Vec<Job>, total: u64, has_more: bool) -> PageResponse<Job> {
    PageResponse::new(items, total, has_more)
}

/// Replays queued responses in order and records every request.
///
/// Requests whose search text is `"slow"` wait on `gate` before answering.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<PageResponse<Job>, FetchError>>>,
    calls: Mutex<Vec<(Query, u32, u32)>>,
    pub gate: Arc<Notify>,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<Result<PageResponse<Job>, FetchError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<(Query, u32, u32)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    type Item = Job;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<Job>, FetchError> {
        self.calls.lock().expect("calls lock").push((query.clone(), page_number, page_size));
        if query.search == "slow" {
            self.gate.notified().await;
        }
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Rejected("no scripted response".to_owned())))
    }
}

/// Wraps another fetcher and records the queries it receives.
pub(crate) struct RecordingFetcher<F> {
    inner: F,
    calls: Mutex<Vec<(Query, u32)>>,
}

impl<F> RecordingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self { inner, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(Query, u32)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RecordingFetcher<F> {
    type Item = F::Item;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<F::Item>, FetchError> {
        self.calls.lock().expect("calls lock").push((query.clone(), page_number));
        self.inner.fetch_page(query, page_number, page_size).await
    }
}
