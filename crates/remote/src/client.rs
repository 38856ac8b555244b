use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use incr_list_core::{env_parse_with_default, truncate, FetchError, ListItem, PageResponse, Query};
use incr_list_engine::PageFetcher;
use serde::de::DeserializeOwned;

use crate::RemoteError;

/// Default per-request timeout, overridable with `INCR_LIST_HTTP_TIMEOUT_SECS`.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Query parameters owned by the paging protocol; filters may not shadow them.
const RESERVED_PARAMS: [&str; 3] = ["page", "page_size", "search"];

/// How much of an error body is kept in the reported failure.
const ERROR_BODY_PREVIEW: usize = 200;

/// Retries for transient failures (timeouts, 429, 5xx).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    /// Delay before retry `n` is `base_delay * 2^(n-1)`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn delay_before(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(6);
        self.base_delay.saturating_mul(1_u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, base_delay: Duration::from_millis(500) }
    }
}

/// Fetches pages of `T` from a JSON HTTP endpoint.
pub struct HttpPageFetcher<T> {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
    _item: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for HttpPageFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<T> HttpPageFetcher<T> {
    /// Creates a fetcher for the endpoint at `base_url`.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute URL or the HTTP client
    /// cannot be built (TLS backend failure).
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let timeout = Duration::from_secs(env_parse_with_default(
            "INCR_LIST_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        ));
        let base_url = base_url.trim_end_matches('/').to_owned();
        reqwest::Url::parse(&base_url).map_err(|e| RemoteError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            bearer_token: None,
            timeout,
            retry: RetryPolicy::default(),
            _item: PhantomData,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_params(query: &Query, page_number: u32, page_size: u32) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), page_number.to_string()),
            ("page_size".to_owned(), page_size.to_string()),
        ];
        if !query.search.is_empty() {
            params.push(("search".to_owned(), query.search.clone()));
        }
        for (key, value) in &query.filters {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                tracing::warn!(filter = %key, "filter name collides with a paging parameter, skipped");
                continue;
            }
            params.push((key.clone(), value.clone()));
        }
        params
    }
}

impl<T: DeserializeOwned> HttpPageFetcher<T> {
    async fn fetch_once(
        &self,
        params: &[(String, String)],
    ) -> Result<PageResponse<T>, FetchError> {
        let mut request = self.client.get(&self.base_url).query(params);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_PREVIEW, "...").into_owned(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            FetchError::Decode(format!(
                "{e} (body: {})",
                truncate(&body, ERROR_BODY_PREVIEW, "...")
            ))
        })
    }

    fn transport_error(&self, err: &reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl<T> PageFetcher for HttpPageFetcher<T>
where
    T: ListItem + DeserializeOwned,
{
    type Item = T;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<T>, FetchError> {
        let params = Self::query_params(query, page_number, page_size);
        let mut attempt = 0_usize;
        loop {
            match self.fetch_once(&params).await {
                Ok(page) => {
                    tracing::debug!(
                        page_number,
                        items = page.items.len(),
                        has_more = page.has_more,
                        "fetched remote page"
                    );
                    return Ok(page);
                },
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    attempt = attempt.saturating_add(1);
                    let delay = self.retry.delay_before(attempt);
                    tracing::warn!(
                        page_number,
                        error = %err,
                        "page fetch retry {attempt}/{} after {delay:?}",
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(err) => return Err(err),
            }
        }
    }
}
