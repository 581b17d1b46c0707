//! Coordinator and workers talking over real loopback TCP

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tidecrawl::config::WorkerConfig;
use tidecrawl::coordinator::{Coordinator, CoordinatorServer, CoordinatorSettings};
use tidecrawl::fetcher::{Descriptor, FetchError, FetchedPage, PageFetcher};
use tidecrawl::protocol::{read_frame, write_frame, CrawlTask, Request, Response, MAX_FRAME_BYTES};
use tidecrawl::sink::MemorySink;
use tidecrawl::worker::{
    ClientError, CoordinatorClient, RemoteCoordinator, SessionEnd, WorkerPool,
};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const SEED: &str = "https://example.com/";

fn settings(threads: u32, grace: Duration) -> CoordinatorSettings {
    CoordinatorSettings {
        start_url: SEED.to_string(),
        scope_domain: "example.com".to_string(),
        duration: Duration::from_secs(60),
        grace_period: grace,
        threads_per_worker: threads,
        expected_nodes: 1,
    }
}

struct Running {
    coordinator: Arc<Coordinator>,
    address: String,
    close: watch::Sender<bool>,
    server: JoinHandle<()>,
    sink: MemorySink,
}

async fn start(settings: CoordinatorSettings, deadline: Instant) -> Running {
    let sink = MemorySink::new();
    let coordinator = Arc::new(Coordinator::with_deadline(
        settings,
        Box::new(sink.clone()),
        deadline,
    ));

    let server = CoordinatorServer::bind("127.0.0.1:0", coordinator.clone())
        .await
        .unwrap();
    let address = server.local_addr().unwrap().to_string();
    let (close, close_rx) = watch::channel(false);
    let server = tokio::spawn(server.serve(close_rx));

    Running {
        coordinator,
        address,
        close,
        server,
        sink,
    }
}

async fn start_default() -> Running {
    start(
        settings(2, Duration::from_secs(15)),
        Instant::now() + Duration::from_secs(60),
    )
    .await
}

#[tokio::test]
async fn test_full_call_cycle_over_tcp() {
    let running = start_default().await;
    let mut client = RemoteCoordinator::connect(&running.address).await.unwrap();

    assert_eq!(client.get_config().await.unwrap(), 2);
    assert_eq!(
        client.request_task("w1").await.unwrap(),
        CrawlTask::Url(SEED.to_string())
    );

    client
        .submit_result(
            "w1",
            SEED,
            "Home",
            vec![
                "https://example.com/b".to_string(),
                "https://external.com/c".to_string(),
                "https://example.com/d.pdf".to_string(),
            ],
        )
        .await
        .unwrap();

    let mut next = HashSet::new();
    for _ in 0..2 {
        match client.request_task("w1").await.unwrap() {
            CrawlTask::Url(url) => {
                next.insert(url);
            }
            other => panic!("expected a URL, got {}", other),
        }
    }
    assert_eq!(
        next,
        HashSet::from([
            "https://example.com/b".to_string(),
            "https://example.com/d.pdf".to_string()
        ])
    );
    assert_eq!(client.request_task("w1").await.unwrap(), CrawlTask::Wait);

    assert_eq!(running.sink.len(), 1);
    assert_eq!(running.coordinator.snapshot().results[0].descriptor, "Home");
}

#[tokio::test]
async fn test_garbage_line_gets_error_and_connection_survives() {
    let running = start_default().await;
    let stream = TcpStream::connect(&running.address).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half.write_all(b"this is not json\n").await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert!(matches!(reply, Response::Error { .. }));

    write_frame(&mut write_half, &Request::GetConfig).await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert_eq!(reply, Response::Config { threads: 2 });
}

#[tokio::test]
async fn test_invalid_utf8_line_gets_error_and_connection_survives() {
    let running = start_default().await;
    let stream = TcpStream::connect(&running.address).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half.write_all(b"\xff\xfe garbage\n").await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert!(matches!(reply, Response::Error { .. }));

    write_frame(&mut write_half, &Request::GetConfig).await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert_eq!(reply, Response::Config { threads: 2 });
}

#[tokio::test]
async fn test_oversized_line_gets_error_and_connection_survives() {
    let running = start_default().await;
    let stream = TcpStream::connect(&running.address).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut line = vec![b'x'; MAX_FRAME_BYTES + 1024];
    line.push(b'\n');
    write_half.write_all(&line).await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert!(matches!(reply, Response::Error { ref message } if message.contains("exceeds")));

    write_frame(&mut write_half, &Request::GetConfig).await.unwrap();
    let reply: Response = read_frame(&mut reader).await.unwrap().unwrap();
    assert_eq!(reply, Response::Config { threads: 2 });
}

#[tokio::test]
async fn test_stop_after_deadline_over_tcp() {
    let running = start(
        settings(1, Duration::from_secs(15)),
        Instant::now() - Duration::from_millis(10),
    )
    .await;
    let mut client = RemoteCoordinator::connect(&running.address).await.unwrap();

    assert_eq!(client.request_task("w1").await.unwrap(), CrawlTask::Stop);

    // Still draining: late results land
    client
        .submit_result("w1", SEED, "Late", vec!["https://example.com/x".to_string()])
        .await
        .unwrap();
    assert!(running.coordinator.snapshot().seen.contains("https://example.com/x"));
}

#[tokio::test]
async fn test_closed_coordinator_rejects_submissions() {
    let running = start(
        settings(1, Duration::ZERO),
        Instant::now() - Duration::from_millis(10),
    )
    .await;
    let mut client = RemoteCoordinator::connect(&running.address).await.unwrap();

    let err = client
        .submit_result("w1", SEED, "Too late", vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m.contains("closed")));
    assert!(running.sink.is_empty());
}

#[tokio::test]
async fn test_shutdown_drops_open_connections() {
    let running = start_default().await;
    let mut client = RemoteCoordinator::connect(&running.address).await.unwrap();
    assert_eq!(client.get_config().await.unwrap(), 2);

    running.close.send(true).unwrap();
    running.server.await.unwrap();

    let err = client.request_task("w1").await.unwrap_err();
    assert!(err.is_transport());
    assert!(RemoteCoordinator::connect(&running.address).await.is_err());
}

/// A synthetic site: page `n` links to pages `2n+1` and `2n+2` up to a limit
struct TreeSite {
    pages: usize,
}

fn page_url(n: usize) -> String {
    if n == 0 {
        SEED.to_string()
    } else {
        format!("https://example.com/p{}", n)
    }
}

#[async_trait]
impl PageFetcher for TreeSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let n = if url == SEED {
            0
        } else {
            url.trim_start_matches("https://example.com/p")
                .parse::<usize>()
                .map_err(|e| FetchError::Parse(e.to_string()))?
        };

        let links = [2 * n + 1, 2 * n + 2]
            .into_iter()
            .filter(|&child| child < self.pages)
            .map(page_url)
            .chain(std::iter::once("https://elsewhere.org/".to_string()))
            .collect();

        tokio::task::yield_now().await;

        Ok(FetchedPage {
            descriptor: Descriptor::Page(format!("Page {}", n)),
            links,
        })
    }
}

#[tokio::test]
async fn test_pool_crawls_each_url_exactly_once() {
    let running = start(
        settings(3, Duration::from_millis(300)),
        Instant::now() + Duration::from_millis(800),
    )
    .await;

    let config = WorkerConfig {
        coordinator_address: running.address.clone(),
        wait_interval_ms: 10,
        reconnect_delay_ms: 10,
        ..WorkerConfig::default()
    };
    let pool = WorkerPool::new(&config, "Node-0042".to_string(), Arc::new(TreeSite { pages: 31 }));

    let report = pool.run().await;

    assert_eq!(report.sessions.len(), 3);
    for session in &report.sessions {
        assert!(session.worker_id.starts_with("Node-0042-T"));
        assert!(matches!(session.end, SessionEnd::Stopped));
    }
    assert_eq!(report.throughput.successes, 31);
    assert_eq!(report.throughput.errors, 0);

    let snapshot = running.coordinator.snapshot();
    assert_eq!(snapshot.dispatched, 31);
    assert_eq!(snapshot.results.len(), 31);
    assert_eq!(snapshot.seen.len(), 31);
    assert!(snapshot.pending.is_empty());
    assert!(!snapshot.seen.contains("https://elsewhere.org/"));

    let unique: HashSet<_> = snapshot.results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(unique.len(), 31);
}
