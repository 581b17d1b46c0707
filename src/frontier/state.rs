//! Frontier state: what is left to crawl, what has been seen, what came back

use crate::url::is_in_scope;
use std::collections::{HashMap, HashSet, VecDeque};

/// One processed URL and the descriptor its worker reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUrl {
    pub url: String,
    pub descriptor: String,
}

/// Point-in-time copy of the frontier, used for reports and tests
#[derive(Debug, Clone, Default)]
pub struct FrontierSnapshot {
    pub pending: Vec<String>,
    pub seen: HashSet<String>,
    pub results: Vec<ProcessedUrl>,
    pub dispatched: usize,
}

/// The deduplicated, domain-scoped URL frontier
///
/// Invariants:
/// - `seen` only grows.
/// - a URL enters `pending` at most once over the frontier's lifetime,
///   because it is only pushed when it is first inserted into `seen`.
///
/// The frontier does no locking of its own; the coordinator wraps it in a
/// single mutex so that the read-check-insert over `seen` is atomic.
#[derive(Debug)]
pub struct Frontier {
    /// Not yet dispatched, in admission order
    pending: VecDeque<String>,

    /// Every URL ever admitted, seed included
    seen: HashSet<String>,

    /// Results in completion order
    results: Vec<ProcessedUrl>,

    /// url -> position in `results`
    result_index: HashMap<String, usize>,

    scope_domain: String,

    dispatched: usize,
}

impl Frontier {
    /// Creates a frontier seeded with `seed`
    ///
    /// The seed is admitted unconditionally, even if it would not pass the
    /// scope test itself.
    pub fn new(seed: impl Into<String>, scope_domain: impl Into<String>) -> Self {
        let seed = seed.into();
        let mut seen = HashSet::new();
        seen.insert(seed.clone());

        Self {
            pending: VecDeque::from([seed]),
            seen,
            results: Vec::new(),
            result_index: HashMap::new(),
            scope_domain: scope_domain.into().to_lowercase(),
            dispatched: 0,
        }
    }

    pub fn scope_domain(&self) -> &str {
        &self.scope_domain
    }

    /// Removes the oldest pending URL, counting it as dispatched
    pub fn pop_next(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.dispatched += 1;
        Some(url)
    }

    /// Records the descriptor for a processed URL
    ///
    /// A second result for the same URL overwrites the first in place, so
    /// the URL keeps its original completion position.
    pub fn record_result(&mut self, url: &str, descriptor: &str) {
        match self.result_index.get(url) {
            Some(&idx) => {
                self.results[idx].descriptor = descriptor.to_string();
            }
            None => {
                self.result_index.insert(url.to_string(), self.results.len());
                self.results.push(ProcessedUrl {
                    url: url.to_string(),
                    descriptor: descriptor.to_string(),
                });
            }
        }
    }

    /// Admits every in-scope, never-seen link; returns how many were new
    pub fn admit_links<S: AsRef<str>>(&mut self, links: &[S]) -> usize {
        let mut admitted = 0;

        for link in links {
            let link = link.as_ref();

            if !is_in_scope(link, &self.scope_domain) {
                continue;
            }

            // insert() is the dedup check: false means already seen
            if self.seen.insert(link.to_string()) {
                self.pending.push_back(link.to_string());
                admitted += 1;
            }
        }

        admitted
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn results(&self) -> &[ProcessedUrl] {
        &self.results
    }

    pub fn descriptor_for(&self, url: &str) -> Option<&str> {
        self.result_index
            .get(url)
            .map(|&idx| self.results[idx].descriptor.as_str())
    }

    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            pending: self.pending.iter().cloned().collect(),
            seen: self.seen.clone(),
            results: self.results.clone(),
            dispatched: self.dispatched,
        }
    }
}
