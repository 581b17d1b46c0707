//! HTTP fetcher behaviour against a mock server

use std::time::Duration;
use tidecrawl::fetcher::{Descriptor, FetchError, FetchSettings, HttpPageFetcher, PageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpPageFetcher {
    HttpPageFetcher::with_client(
        reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap(),
        FetchSettings {
            politeness_min: Duration::ZERO,
            politeness_max: Duration::ZERO,
            max_attempts: 3,
            backoff_base: Duration::from_millis(10),
        },
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

#[tokio::test]
async fn test_html_page_descriptor_and_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <a href="https://external.example/x">Elsewhere</a>
            <a href="/about#team">Team</a>
            <a href="mailto:someone@example.com">Mail</a>
            </body></html>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher().fetch(&format!("{}/", server.uri())).await.unwrap();

    assert_eq!(page.descriptor, Descriptor::Page("Home".to_string()));
    assert_eq!(
        page.links,
        vec![
            format!("{}/about", server.uri()),
            "https://external.example/x".to_string()
        ]
    );
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher().fetch(&format!("{}/missing", server.uri())).await;

    assert_eq!(result, Err(FetchError::Status(404)));
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = fetcher().fetch(&format!("{}/flaky", server.uri())).await;

    assert_eq!(
        result,
        Err(FetchError::RetriesExhausted {
            last_status: Some(503)
        })
    );
}

#[tokio::test]
async fn test_recovers_after_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(html("<title>Back</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/recovering", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.descriptor, Descriptor::Page("Back".to_string()));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(html("<title>Finally</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher().fetch(&format!("{}/busy", server.uri())).await.unwrap();
    assert_eq!(page.descriptor, Descriptor::Page("Finally".to_string()));
}

#[tokio::test]
async fn test_non_html_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let page = fetcher().fetch(&format!("{}/api", server.uri())).await.unwrap();

    assert!(matches!(page.descriptor, Descriptor::Skipped(ref ct) if ct.starts_with("application/json")));
    assert!(page.descriptor.to_string().starts_with("[SKIPPED] application/json"));
    assert!(page.links.is_empty());
}

#[tokio::test]
async fn test_file_urls_never_hit_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/files/report.pdf?v=2", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.descriptor, Descriptor::File("PDF".to_string()));
    assert_eq!(page.descriptor.to_string(), "[FILE] PDF");
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<title>New</title><a href="child">Child</a>"#))
        .mount(&server)
        .await;

    let page = fetcher().fetch(&format!("{}/old", server.uri())).await.unwrap();

    assert_eq!(page.links, vec![format!("{}/new/child", server.uri())]);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let address = crate::free_local_address();

    let result = fetcher().fetch(&format!("http://{}/", address)).await;

    assert!(matches!(result, Err(FetchError::Network(_))));
}
