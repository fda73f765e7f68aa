//! Integration tests for the catalog cache over a mock TMDB server.
//!
//! Each test starts its own wiremock server and in-memory storage. Popular
//! pages hand out sequential ids; `/movie/{id}` answers with a runtime of
//! `id * 10` minutes.

use reelswipe::catalog::{
    CatalogCache, CatalogConfig, FetchInitialOutcome, LoadMoreOutcome, MovieId,
};
use reelswipe::remote;
use reelswipe::storage::Storage;
use reelswipe::tmdb::TmdbClient;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn page_body(page: u32, per_page: u64, total_pages: u32) -> String {
    let start = u64::from(page - 1) * per_page + 1;
    let results: Vec<String> = (start..start + per_page)
        .map(|id| {
            format!(r#"{{"id":{id},"title":"Movie {id}","genre_ids":[18],"vote_average":7.0}}"#)
        })
        .collect();
    format!(
        r#"{{"page":{page},"results":[{}],"total_pages":{total_pages},"total_results":{}}}"#,
        results.join(","),
        u64::from(total_pages) * per_page
    )
}

async fn mount_pages(server: &MockServer, pages: u32, per_page: u64, delay: Duration) {
    for page in 1..=pages {
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page_body(page, per_page, pages))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }
}

fn runtime_response(req: &Request) -> ResponseTemplate {
    let id: u64 = req
        .url
        .path()
        .trim_start_matches("/movie/")
        .parse()
        .unwrap_or(0);
    ResponseTemplate::new(200).set_body_string(format!(
        r#"{{"id":{id},"title":"Movie {id}","runtime":{}}}"#,
        id * 10
    ))
}

async fn mount_runtimes(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/movie/\d+$"))
        .respond_with(move |req: &Request| runtime_response(req).set_delay(delay))
        .mount(server)
        .await;
}

fn cache(
    server: &MockServer,
    storage: Storage,
    page_size: usize,
    item_cap: usize,
) -> CatalogCache {
    let tmdb = TmdbClient::new(
        remote::build_client().unwrap(),
        &server.uri(),
        SecretString::from("test-key"),
    )
    .unwrap();
    CatalogCache::new(
        Arc::new(tmdb),
        storage,
        CatalogConfig {
            page_size,
            item_cap,
        },
    )
}

fn ids(cache: &CatalogCache) -> Vec<u64> {
    cache.items().iter().map(|m| m.id.get()).collect()
}

#[tokio::test]
async fn test_two_pages_then_reset_keeps_first_page() {
    let server = MockServer::start().await;
    mount_pages(&server, 2, 4, Duration::ZERO).await;
    mount_runtimes(&server, Duration::ZERO).await;

    let cache = cache(&server, Storage::in_memory(), 4, 8);
    assert_eq!(cache.fetch_initial().await, FetchInitialOutcome::Loaded(4));
    assert_eq!(cache.load_more().await, LoadMoreOutcome::Loaded(4));
    assert_eq!(ids(&cache), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert!(!cache.has_more());
    assert_eq!(cache.load_more().await, LoadMoreOutcome::AtLastPage);

    cache.reset_to_first_page().await;
    assert_eq!(ids(&cache), vec![1, 2, 3, 4]);
    assert_eq!(cache.current_page(), 1);
    assert!(cache.has_more());
}

#[tokio::test]
async fn test_concurrent_load_more_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(1, 3, 5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_body(2, 3, 5))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_runtimes(&server, Duration::ZERO).await;

    let cache = cache(&server, Storage::in_memory(), 3, 15);
    cache.fetch_initial().await;

    let (a, b) = tokio::join!(cache.load_more(), cache.load_more());
    let mut outcomes = vec![a, b];
    outcomes.sort_by_key(|o| matches!(o, LoadMoreOutcome::Busy));
    assert_eq!(outcomes, vec![LoadMoreOutcome::Loaded(3), LoadMoreOutcome::Busy]);
    assert_eq!(cache.len(), 6);
    assert_eq!(cache.current_page(), 2);
}

#[tokio::test]
async fn test_slow_runtimes_land_on_the_right_items() {
    let server = MockServer::start().await;
    mount_pages(&server, 4, 2, Duration::ZERO).await;
    mount_runtimes(&server, Duration::from_millis(300)).await;

    let storage = Storage::in_memory();
    let cache = cache(&server, storage.clone(), 2, 8);
    cache.fetch_initial().await;
    for _ in 0..3 {
        assert_eq!(cache.load_more().await, LoadMoreOutcome::Loaded(2));
    }
    // Runtimes are still in flight
    assert!(cache.items().iter().all(|m| m.duration_minutes == 0));

    cache.settle().await;
    for movie in cache.items() {
        assert_eq!(u64::from(movie.duration_minutes), movie.id.get() * 10);
    }
    let durations = storage.movie_durations().await.unwrap();
    assert_eq!(durations.len(), 8);
}

#[tokio::test]
async fn test_one_failing_runtime_does_not_block_others() {
    let server = MockServer::start().await;
    mount_pages(&server, 1, 3, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/movie/2"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_runtimes(&server, Duration::ZERO).await;

    let storage = Storage::in_memory();
    let cache = cache(&server, storage.clone(), 3, 30);
    cache.fetch_initial().await;
    cache.settle().await;

    let durations: Vec<u32> = cache.items().iter().map(|m| m.duration_minutes).collect();
    assert_eq!(durations, vec![10, 0, 30]);
    assert_eq!(storage.duration_for(MovieId::new(2)).await.unwrap(), None);
}

#[tokio::test]
async fn test_cached_runtimes_skip_detail_fetch() {
    let server = MockServer::start().await;
    mount_pages(&server, 1, 2, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/movie/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":0,"runtime":1}"#))
        .expect(0)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    storage.record_duration(MovieId::new(1), 95).await.unwrap();
    storage.record_duration(MovieId::new(2), 120).await.unwrap();

    let cache = cache(&server, storage, 2, 20);
    cache.fetch_initial().await;
    cache.settle().await;

    let durations: Vec<u32> = cache.items().iter().map(|m| m.duration_minutes).collect();
    assert_eq!(durations, vec![95, 120]);
}

#[tokio::test]
async fn test_unreachable_catalog_falls_back_and_recovers() {
    let server = MockServer::start().await;
    let cache = cache(&server, Storage::in_memory(), 4, 8);

    assert_eq!(cache.fetch_initial().await, FetchInitialOutcome::Fallback);
    assert!(cache.is_using_fallback());
    assert!(!cache.items().is_empty());
    assert_eq!(cache.load_more().await, LoadMoreOutcome::AtLastPage);

    mount_pages(&server, 2, 4, Duration::ZERO).await;
    mount_runtimes(&server, Duration::ZERO).await;
    assert_eq!(cache.retry_initial().await, FetchInitialOutcome::Loaded(4));
    assert!(!cache.is_using_fallback());
    assert_eq!(ids(&cache), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_reset_during_load_more_drops_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(1, 4, 3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_body(2, 4, 3))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_runtimes(&server, Duration::ZERO).await;

    let cache = cache(&server, Storage::in_memory(), 4, 12);
    cache.fetch_initial().await;

    let (outcome, ()) = tokio::join!(cache.load_more(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.reset_to_first_page().await;
    });
    assert_eq!(outcome, LoadMoreOutcome::Superseded);
    assert_eq!(ids(&cache), vec![1, 2, 3, 4]);
    assert_eq!(cache.current_page(), 1);
    assert!(!cache.is_loading_more());

    // The same page loads normally afterwards
    assert_eq!(cache.load_more().await, LoadMoreOutcome::Loaded(4));
    assert_eq!(ids(&cache), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn test_runtime_resolved_after_reset_returns_with_the_page() {
    let server = MockServer::start().await;
    mount_pages(&server, 2, 2, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/movie/\d+$"))
        .respond_with(|req: &Request| runtime_response(req).set_delay(Duration::from_millis(200)))
        .expect(4)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    let cache = cache(&server, storage.clone(), 2, 4);
    cache.fetch_initial().await;
    cache.load_more().await;
    cache.reset_to_first_page().await;
    assert_eq!(ids(&cache), vec![1, 2]);

    // Runtimes for 3 and 4 land while those items are gone
    cache.settle().await;
    assert_eq!(storage.duration_for(MovieId::new(3)).await.unwrap(), Some(30));

    assert_eq!(cache.load_more().await, LoadMoreOutcome::Loaded(2));
    let durations: Vec<u32> = cache.items().iter().map(|m| m.duration_minutes).collect();
    assert_eq!(durations, vec![10, 20, 30, 40]);
    cache.settle().await;
}

#[tokio::test]
async fn test_shutdown_aborts_enrichment() {
    let server = MockServer::start().await;
    mount_pages(&server, 1, 3, Duration::ZERO).await;
    mount_runtimes(&server, Duration::from_millis(300)).await;

    let storage = Storage::in_memory();
    let cache = cache(&server, storage.clone(), 3, 30);
    cache.fetch_initial().await;
    cache.shutdown();
    cache.settle().await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(cache.items().iter().all(|m| m.duration_minutes == 0));
    assert!(storage.movie_durations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_drop_aborts_enrichment() {
    let server = MockServer::start().await;
    mount_pages(&server, 1, 3, Duration::ZERO).await;
    mount_runtimes(&server, Duration::from_millis(300)).await;

    let storage = Storage::in_memory();
    {
        let cache = cache(&server, storage.clone(), 3, 30);
        cache.fetch_initial().await;
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(storage.movie_durations().await.unwrap().is_empty());
}
