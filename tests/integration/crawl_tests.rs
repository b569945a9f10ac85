//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use keyword_crawler::checkpoint::CheckpointManager;
use keyword_crawler::config::Config;
use keyword_crawler::crawler::Coordinator;
use keyword_crawler::state::CrawlPhase;
use keyword_crawler::storage::{open_storage, RunStatus, Storage};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seeds` for `keywords`
fn create_test_config(dir: &TempDir, keywords: &[&str], seeds: Vec<String>) -> Config {
    let mut config = Config::default();
    config.crawler.keywords = keywords.iter().map(|k| k.to_string()).collect();
    config.crawler.seed_urls = seeds;
    config.crawler.max_depth = 1;
    config.crawler.delay = 0.0;
    config.crawler.user_agent = "TestBot/1.0".to_string();
    config.checkpoint.directory = dir
        .path()
        .join("checkpoints")
        .to_string_lossy()
        .into_owned();
    config
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_domain_crawl() {
    let site_a = MockServer::start().await;
    let site_b = MockServer::start().await;
    mount_robots(&site_a, "User-agent: *\nAllow: /").await;
    mount_robots(&site_b, "User-agent: *\nAllow: /").await;

    mount_page(
        &site_a,
        "/",
        format!(
            r#"<html><head><title>A home</title></head><body>
            All about foo. <a href="{}/x">to B</a>
            </body></html>"#,
            site_b.uri()
        ),
        1,
    )
    .await;
    mount_page(
        &site_b,
        "/x",
        format!(
            r#"<html><head><title>B page</title></head><body>
            More foo here. <a href="{}/deeper">back to A</a>
            </body></html>"#,
            site_a.uri()
        ),
        1,
    )
    .await;
    mount_page(&site_a, "/deeper", "<html><body>foo</body></html>".to_string(), 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, &["foo"], vec![format!("{}/", site_a.uri())]);
    let mut coordinator = Coordinator::new(&config).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.relevant_found, 2);
    assert_eq!(report.results[0].title, "A home");
    assert_eq!(report.results[0].depth, 0);
    assert_eq!(report.results[1].title, "B page");
    assert_eq!(report.results[1].depth, 1);
    assert!(report.results.iter().all(|r| r.relevance_score == 1.0));
}

#[tokio::test]
async fn test_robots_txt_respected() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    mount_page(
        &server,
        "/",
        r#"<html><body>foo <a href="/private/page">secret</a> <a href="/public">open</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&server, "/private/page", "<html><body>foo</body></html>".to_string(), 0).await;
    mount_page(&server, "/public", "<html><body>nothing</body></html>".to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, &["foo"], vec![format!("{}/", server.uri())]);
    let mut coordinator = Coordinator::new(&config).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.relevant_found, 1);
}

#[tokio::test]
async fn test_equivalent_urls_fetched_once() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    let links = r##"
        <a href="/a">a</a>
        <a href="/a/">a slash</a>
        <a href="/a#section">a fragment</a>
        <a href="/a/index.html">a index</a>
        <a href="/">home</a>
    "##;
    mount_page(
        &server,
        "/",
        format!("<html><body>foo {}</body></html>", links),
        1,
    )
    .await;
    mount_page(
        &server,
        "/a",
        format!("<html><body>foo again {}</body></html>", links),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &["foo"], vec![format!("{}/", server.uri())]);
    config.crawler.max_depth = 3;
    let mut coordinator = Coordinator::new(&config).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.relevant_found, 2);
}

#[tokio::test]
async fn test_stay_in_domain() {
    let site_a = MockServer::start().await;
    let site_b = MockServer::start().await;
    mount_robots(&site_a, "").await;

    mount_page(
        &site_a,
        "/",
        format!(
            r#"<html><body>foo <a href="{}/out">out</a> <a href="/in">in</a></body></html>"#,
            site_b.uri()
        ),
        1,
    )
    .await;
    mount_page(&site_a, "/in", "<html><body>foo</body></html>".to_string(), 1).await;
    mount_page(&site_b, "/out", "<html><body>foo</body></html>".to_string(), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &["foo"], vec![format!("{}/", site_a.uri())]);
    config.domains.stay_in_domain = true;
    let mut coordinator = Coordinator::new(&config).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_visited, 3);
}

#[tokio::test]
async fn test_rate_limit_spacing() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">a</a><a href="/b">b</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/a", "<html><body>a</body></html>".to_string(), 1).await;
    mount_page(&server, "/b", "<html><body>b</body></html>".to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &["foo"], vec![format!("{}/", server.uri())]);
    config.crawler.delay = 0.2;
    let mut coordinator = Coordinator::new(&config).unwrap();

    let started = Instant::now();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_tfidf_results_sorted_by_score() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    mount_page(
        &server,
        "/",
        r#"<html><body>only foo here <a href="/both">next</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/both",
        "<html><body>foo and bar together</body></html>".to_string(),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &["foo", "bar"], vec![format!("{}/", server.uri())]);
    config.matching.use_tfidf = true;
    let mut coordinator = Coordinator::new(&config).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.relevant_found, 2);
    assert!(report.results[0].url.ends_with("/both"));
    assert_eq!(report.results[0].relevance_score, 1.0);
    assert_eq!(report.results[1].relevance_score, 0.5);
    assert!(report.results.iter().all(|r| r.content.is_none()));
}

#[tokio::test]
async fn test_resume_from_checkpoint() {
    let site_a = MockServer::start().await;
    let site_b = MockServer::start().await;
    mount_robots(&site_a, "").await;
    mount_page(&site_a, "/", "<html><body>foo</body></html>".to_string(), 1).await;
    mount_page(&site_b, "/", "<html><body>foo</body></html>".to_string(), 0).await;

    let dir = TempDir::new().unwrap();

    // Interrupted before the first page: everything stays queued
    let config = create_test_config(&dir, &["foo"], vec![format!("{}/", site_a.uri())]);
    let mut first = Coordinator::new(&config).unwrap();
    first.shutdown_handle().store(true, Ordering::SeqCst);
    let interrupted = first.run().await.unwrap();
    assert!(interrupted.interrupted);
    let checkpoint = interrupted.final_checkpoint.unwrap();

    let snapshot = CheckpointManager::load(&checkpoint).unwrap();
    assert_eq!(snapshot.queue.len(), 1);
    assert!(snapshot.visited.is_empty());

    let other = create_test_config(&dir, &["foo"], vec![format!("{}/", site_b.uri())]);
    let mut second = Coordinator::new(&other).unwrap();
    second.resume(&checkpoint).unwrap();
    let report = second.run().await.unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.relevant_found, 1);
    assert!(report.results[0].url.starts_with(&site_a.uri()));
}

#[tokio::test]
async fn test_storage_sessions_and_cross_session_dedup() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(&server, "/", "<html><head><title>Foo</title></head><body>foo</body></html>".to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(&dir, &["foo"], vec![format!("{}/", server.uri())]);

    for _ in 0..2 {
        let storage = open_storage(&db_path).unwrap();
        let mut coordinator = Coordinator::new(&config)
            .unwrap()
            .with_storage(Box::new(storage), "hash");
        coordinator.run().await.unwrap();
    }

    let storage = open_storage(&db_path).unwrap();
    let stats = storage.get_statistics().unwrap();
    assert_eq!(stats.total_pages, 1);
    assert_eq!(stats.total_sessions, 2);
    assert!((stats.average_relevance - 1.0).abs() < 1e-9);

    let sessions = storage.get_sessions(10, 0).unwrap();
    assert!(sessions.iter().all(|s| s.status == RunStatus::Completed));
    assert!(sessions.iter().all(|s| s.config_hash == "hash"));
    // Newest first: the second session found the page already stored
    assert_eq!(sessions[0].relevant_found, 0);
    assert_eq!(sessions[1].relevant_found, 1);

    let pages = storage.get_relevant_pages(10, 0, 0.0).unwrap();
    assert_eq!(pages[0].title.as_deref(), Some("Foo"));
    assert_eq!(pages[0].keywords_matched, vec!["foo".to_string()]);
}
