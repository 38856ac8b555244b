use std::time::Duration;

use incr_list_core::{FetchError, ListItem, PageSize, Query};
use incr_list_engine::{FetchOutcome, PageFetchCoordinator, PageFetcher};
use serde::Deserialize;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{HttpPageFetcher, RemoteError, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Posting {
    id: u64,
    title: String,
}

impl ListItem for Posting {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

fn fetcher(server: &MockServer) -> HttpPageFetcher<Posting> {
    HttpPageFetcher::new(&format!("{}/jobs/", server.uri()))
        .expect("fetcher")
        .with_retry(RetryPolicy { max_retries: 2, base_delay: Duration::ZERO })
}

fn page_body(ids: std::ops::Range<u64>, total: u64, has_more: bool) -> serde_json::Value {
    let items: Vec<_> =
        ids.map(|id| serde_json::json!({ "id": id, "title": format!("Engineer {id}") })).collect();
    serde_json::json!({ "items": items, "total": total, "has_more": has_more })
}

#[tokio::test]
async fn test_sends_paging_search_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "20"))
        .and(query_param("search", "engineer"))
        .and(query_param("location", "remote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(20..40, 45, true)))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new().with_search("engineer").with_filter("location", "remote");
    let page = fetcher(&server).fetch_page(&query, 2, 20).await.expect("page");

    assert_eq!(page.items.len(), 20);
    assert_eq!(page.items.first().map(|p| p.title.as_str()), Some("Engineer 20"));
    assert_eq!(page.total, 45);
    assert!(page.has_more);
}

#[tokio::test]
async fn test_empty_search_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..0, 0, false)))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher(&server).fetch_page(&Query::new(), 1, 20).await.expect("page");
    assert!(page.items.is_empty());
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_filter_cannot_shadow_paging_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, 3, false)))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new().with_filter("page", "99");
    let page = fetcher(&server).fetch_page(&query, 1, 20).await.expect("page");
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..1, 1, false)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server).with_bearer_token("secret");
    assert!(!format!("{fetcher:?}").contains("secret"));
    fetcher.fetch_page(&Query::new(), 1, 20).await.expect("page");
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..5, 5, false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let page = fetcher(&server).fetch_page(&Query::new(), 1, 20).await.expect("page");
    assert_eq!(page.items.len(), 5);
}

#[tokio::test]
async fn test_retries_exhausted_reports_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page(&Query::new(), 1, 20).await.expect_err("502");
    assert_eq!(err, FetchError::Http { status: 502, body: "Bad gateway".to_owned() });
}

#[tokio::test]
async fn test_no_retry_on_client_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page(&Query::new(), 1, 20).await.expect_err("404");
    assert!(matches!(err, FetchError::Http { status: 404, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"items\": 3}"))
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page(&Query::new(), 1, 20).await.expect_err("decode");
    let FetchError::Decode(message) = err else {
        panic!("expected decode error, got {err:?}");
    };
    assert!(message.contains("{\"items\": 3}"));
}

#[tokio::test]
async fn test_camel_case_has_more_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "id": 1, "title": "Engineer" }],
            "total": 30,
            "hasMore": true
        })))
        .mount(&server)
        .await;

    let page = fetcher(&server).fetch_page(&Query::new(), 1, 1).await.expect("page");
    assert!(page.has_more);
}

#[tokio::test]
async fn test_drives_coordinator_over_http() {
    let server = MockServer::start().await;
    for (page, ids, has_more) in [("1", 0..20, true), ("2", 20..40, true), ("3", 40..45, false)] {
        Mock::given(method("GET"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(ids, 45, has_more)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let coordinator =
        PageFetchCoordinator::new(fetcher(&server), PageSize::new(20).expect("page size"));
    coordinator.start_generation(Query::new().with_search("engineer")).await;
    for _ in 0..5 {
        if coordinator.load_more().await.is_none() {
            break;
        }
    }

    let state = coordinator.snapshot();
    let ids: Vec<u64> = state.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, (0..45).collect::<Vec<_>>());
    assert!(!state.has_more);
    assert_eq!(coordinator.load_more().await, None::<FetchOutcome>);
}

#[test]
fn test_rejects_relative_base_url() {
    let err = HttpPageFetcher::<Posting>::new("/jobs").expect_err("relative url");
    assert!(matches!(err, RemoteError::InvalidBaseUrl { .. }));
}

#[test]
fn test_retry_delay_doubles() {
    let policy = RetryPolicy { max_retries: 3, base_delay: Duration::from_millis(100) };
    assert_eq!(policy.delay_before(1), Duration::from_millis(100));
    assert_eq!(policy.delay_before(2), Duration::from_millis(200));
    assert_eq!(policy.delay_before(3), Duration::from_millis(400));
}
