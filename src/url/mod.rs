//! URL handling module for Tidecrawl
//!
//! Host extraction and the scope test that decides which discovered links
//! may enter the frontier.

mod domain;

pub use domain::{derive_scope_domain, extract_host, is_in_scope, parse_http_url};
