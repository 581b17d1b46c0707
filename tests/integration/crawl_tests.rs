//! Integration tests for a full crawl
//!
//! These tests use wiremock to serve a small site, run the master and a
//! worker process against it, and check the report and results log.

use std::path::Path;
use std::time::Duration;
use tidecrawl::config::{Config, SinkFormat};
use tidecrawl::coordinator::run_master_until;
use tidecrawl::worker::run_worker;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Creates a test configuration crawling `start_url` with results under `dir`
fn create_test_config(start_url: &str, dir: &Path, format: SinkFormat) -> Config {
    let address = crate::free_local_address();
    let results_file = match format {
        SinkFormat::Csv => "results.csv",
        SinkFormat::Sqlite => "results.db",
    };

    let mut config = Config::default();
    config.master.start_url = start_url.to_string();
    config.master.bind_address = address.clone();
    config.master.threads_per_worker = 2;
    config.output.results_path = dir.join(results_file).to_string_lossy().into_owned();
    config.output.summary_path = dir.join("summary.md").to_string_lossy().into_owned();
    config.output.format = format;
    config.worker.coordinator_address = address;
    config.worker.politeness_min_ms = 0;
    config.worker.politeness_max_ms = 0;
    config.worker.backoff_base_ms = 10;
    config.worker.wait_interval_ms = 20;
    config.worker.reconnect_delay_ms = 20;
    config
}

async fn mount_site(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{base}/a">A</a>
            <a href="/b">B</a>
            <a href="/docs/guide.pdf">Guide</a>
            <a href="https://external.example/c">External</a>
            </body></html>"#
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(
            r#"<html><head><meta name="description" content="Page A"></head>
            <body><a href="/b">B again</a><a href="/">Home</a></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<html><body><p>Just a paragraph.</p></body></html>".to_string()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/guide.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_master_and_worker() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), dir.path(), SinkFormat::Csv);

    let worker_config = config.worker.clone();
    let worker = tokio::spawn(async move {
        // Give the master time to bind
        tokio::time::sleep(Duration::from_millis(200)).await;
        run_worker(&worker_config, Some("it".to_string())).await
    });

    let summary = run_master_until(
        &config,
        Some("testhash".to_string()),
        tokio::time::sleep(Duration::from_secs(3)),
    )
    .await
    .unwrap();

    let pool = worker.await.unwrap().unwrap();

    // Home, A, B and the PDF; the external link never enters the frontier
    assert_eq!(summary.total_processed, 4);
    assert_eq!(summary.file_count, 1);
    assert_eq!(summary.html_pages, 3);
    assert_eq!(summary.unique_urls, 4);
    assert_eq!(summary.scope_domain, "127.0.0.1");
    assert_eq!(summary.shutdown_reason, "operator interrupt");

    let descriptors: Vec<&str> = summary
        .processed
        .iter()
        .map(|p| p.descriptor.as_str())
        .collect();
    assert!(descriptors.contains(&"Home"));
    assert!(descriptors.contains(&"Page A"));
    assert!(descriptors.contains(&"Just a paragraph."));
    assert!(descriptors.contains(&"[FILE] PDF"));

    assert_eq!(pool.sessions.len(), 2);
    assert_eq!(pool.throughput.successes, 4);
    assert_eq!(pool.throughput.errors, 0);

    let report = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(report.contains("# Tidecrawl Crawl Report"));
    assert!(report.contains("testhash"));
    assert!(report.contains("| Files / Media | 1 |"));

    let mut results = csv::Reader::from_path(dir.path().join("results.csv")).unwrap();
    let urls: Vec<String> = results
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(urls.len(), 4);
    assert!(urls.contains(&format!("{}/docs/guide.pdf", server.uri())));
}

#[tokio::test]
async fn test_crawl_with_sqlite_results() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), dir.path(), SinkFormat::Sqlite);

    let worker_config = config.worker.clone();
    let worker = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        run_worker(&worker_config, None).await
    });

    let summary = run_master_until(&config, None, tokio::time::sleep(Duration::from_secs(3)))
        .await
        .unwrap();
    worker.await.unwrap().unwrap();

    assert_eq!(summary.total_processed, 4);

    let conn = rusqlite::Connection::open(dir.path().join("results.db")).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM crawl_results", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_master_without_workers_still_reports() {
    let dir = tempdir().unwrap();
    let config = create_test_config("https://www.example.com/", dir.path(), SinkFormat::Csv);

    let summary = run_master_until(&config, None, tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    assert_eq!(summary.total_processed, 0);
    assert_eq!(summary.unique_urls, 1);
    assert_eq!(summary.pending_remaining, 1);
    assert_eq!(summary.scope_domain, "example.com");

    let report = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(report.contains("_No URLs were processed._"));
}
