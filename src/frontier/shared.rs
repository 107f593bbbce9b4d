//! Concurrency-safe handle over the frontier state
//!
//! All workers share one `Frontier`. Every mutation goes through a single
//! mutex so that claiming a page, recording discoveries, and moving file URLs
//! between the undownloaded and downloaded sets are atomic with respect to
//! each other. A transient in-flight set (not persisted) prevents two workers
//! from downloading the same file at the same time.

use crate::frontier::store::FrontierState;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

struct Inner {
    state: FrontierState,
    in_flight_downloads: HashSet<String>,
}

/// Shared, mutex-guarded frontier
pub struct Frontier {
    inner: Mutex<Inner>,
}

impl Frontier {
    /// Wraps a loaded frontier state for shared use
    pub fn new(state: FrontierState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                in_flight_downloads: HashSet::new(),
            }),
        }
    }

    /// Atomically claims a page URL for processing
    ///
    /// Moves the URL from uncrawled to crawled and returns true. Returns
    /// false if the URL was already crawled, in which case the caller must
    /// skip it. Claiming up front means a URL enqueued from several pages is
    /// fetched at most once per run, and every terminal outcome (success,
    /// no-content, not-found) leaves it in the crawled set.
    pub fn claim_page(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state.crawled.contains(url) {
            return false;
        }
        inner.state.uncrawled.remove(url);
        inner.state.crawled.insert(url.to_string());
        true
    }

    /// Records newly discovered page URLs, returning the ones worth enqueuing
    ///
    /// URLs already crawled or already pending from a prior discovery are
    /// filtered out; the rest are inserted into the uncrawled set and
    /// returned in input order.
    pub fn discover_pages(&self, urls: Vec<String>) -> Vec<String> {
        let mut inner = self.inner.lock().unwrap();
        let mut fresh = Vec::new();
        for url in urls {
            if inner.state.crawled.contains(&url) {
                continue;
            }
            if inner.state.uncrawled.insert(url.clone()) {
                fresh.push(url);
            }
        }
        fresh
    }

    /// Records discovered file URLs as pending downloads
    pub fn discover_files<'a>(&self, urls: impl IntoIterator<Item = &'a str>) {
        let mut inner = self.inner.lock().unwrap();
        for url in urls {
            if !inner.state.downloaded.contains(url) {
                inner.state.undownloaded.insert(url.to_string());
            }
        }
    }

    /// Atomically claims a file URL for download
    ///
    /// Returns false if the file is already downloaded or another worker is
    /// downloading it right now.
    pub fn claim_download(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state.downloaded.contains(url) {
            return false;
        }
        inner.in_flight_downloads.insert(url.to_string())
    }

    /// Marks a claimed download as successfully written
    pub fn finish_download(&self, url: &str, success: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight_downloads.remove(url);
        if success {
            inner.state.undownloaded.remove(url);
            inner.state.downloaded.insert(url.to_string());
        }
        // On failure the URL stays in undownloaded for a future run.
    }

    /// Returns the pending page URLs (used to seed a resumed run)
    pub fn uncrawled_snapshot(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.state.uncrawled.iter().cloned().collect()
    }

    /// Persists the four sets to the state directory
    pub fn save(&self, state_dir: &Path) -> std::io::Result<()> {
        let inner = self.inner.lock().unwrap();
        inner.state.save(state_dir)
    }

    /// Copies out the current state (for tests and shutdown reporting)
    pub fn snapshot(&self) -> FrontierState {
        self.inner.lock().unwrap().state.clone()
    }
}
