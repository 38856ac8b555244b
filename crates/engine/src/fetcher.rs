use std::sync::Arc;

use async_trait::async_trait;
use incr_list_core::{FetchError, ListItem, PageResponse, Query};

/// Fetch collaborator supplied by the caller.
///
/// The coordinator knows nothing about URLs, headers or auth; it only calls
/// this with the active query and the page it wants.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Item: ListItem;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<Self::Item>, FetchError>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    type Item = F::Item;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<Self::Item>, FetchError> {
        (**self).fetch_page(query, page_number, page_size).await
    }
}

type MatchFn<T> = dyn Fn(&T, &Query) -> bool + Send + Sync;

/// Serves pages out of an in-process collection.
///
/// Items are filtered by a caller-supplied predicate and then paged in their
/// original order, so it behaves like a well-behaved server endpoint.
pub struct InMemoryFetcher<T> {
    items: Vec<T>,
    matches: Box<MatchFn<T>>,
}

impl<T: ListItem> InMemoryFetcher<T> {
    #[must_use]
    pub fn new<M>(items: Vec<T>, matches: M) -> Self
    where
        M: Fn(&T, &Query) -> bool + Send + Sync + 'static,
    {
        Self { items, matches: Box::new(matches) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl<T: ListItem> PageFetcher for InMemoryFetcher<T> {
    type Item = T;

    async fn fetch_page(
        &self,
        query: &Query,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResponse<T>, FetchError> {
        if page_number == 0 || page_size == 0 {
            return Err(FetchError::Rejected(format!(
                "page {page_number} of size {page_size} is not addressable"
            )));
        }
        let matching: Vec<&T> = self.items.iter().filter(|item| (self.matches)(*item, query)).collect();
        let size = page_size as usize;
        let start = (page_number as usize).saturating_sub(1).saturating_mul(size);
        let end = start.saturating_add(size).min(matching.len());
        let items: Vec<T> = matching.get(start..end).unwrap_or_default().iter().copied().cloned().collect();
        Ok(PageResponse::new(items, matching.len() as u64, end < matching.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u32);

    impl ListItem for Row {
        type Key = u32;

        fn key(&self) -> u32 {
            self.0
        }
    }

    fn fetcher() -> InMemoryFetcher<Row> {
        InMemoryFetcher::new((1..=45).map(Row).collect(), |row, query| {
            query.search.is_empty() || row.0.to_string().contains(&query.search)
        })
    }

    #[tokio::test]
    async fn pages_in_order_with_totals() {
        let f = fetcher();
        let q = Query::new();
        let first = f.fetch_page(&q, 1, 20).await.expect("page 1");
        assert_eq!(first.items.first(), Some(&Row(1)));
        assert_eq!((first.items.len(), first.total, first.has_more), (20, 45, true));

        let last = f.fetch_page(&q, 3, 20).await.expect("page 3");
        assert_eq!((last.items.len(), last.has_more), (5, false));

        let beyond = f.fetch_page(&q, 4, 20).await.expect("page 4");
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn filters_before_paging() {
        let page = fetcher().fetch_page(&Query::new().with_search("4"), 1, 20).await.expect("page");
        let keys: Vec<u32> = page.items.iter().map(|r| r.0).collect();
        assert_eq!(keys, vec![4, 14, 24, 34, 40, 41, 42, 43, 44, 45]);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn page_zero_rejected() {
        let err = fetcher().fetch_page(&Query::new(), 0, 20).await.unwrap_err();
        assert!(matches!(err, FetchError::Rejected(_)));
    }
}
