mod coordination_tests;
mod crawl_tests;
mod fetcher_tests;

/// A loopback address nothing is listening on right now
pub(crate) fn free_local_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}
