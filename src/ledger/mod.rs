//! JSON page-info ledger
//!
//! One record per distinct page URL, stored as a JSON array. Recording an
//! already-known URL replaces its entry in place rather than appending a
//! duplicate. An unparseable or absent ledger file is treated as empty (the
//! old content is overwritten on the next write, so corruption loses
//! history - the trade-off is logged when it happens).
//!
//! `Ledger` itself is a plain read-modify-write over one file; concurrent
//! writers must serialize through the shared `tokio::sync::Mutex` the crawler
//! wraps it in.

use crate::CrawlError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-page crawl metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The page URL (ledger key)
    pub url: String,

    /// Path of the converted markdown document
    pub file_path: String,

    /// File-link URL → anchor text, for every file reference on the page
    pub file_links: BTreeMap<String, String>,

    /// Local timestamp of the recording, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
}

/// Handle to the ledger file
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upserts a record for `url` and rewrites the whole array
    pub fn record(
        &self,
        url: &str,
        file_path: &str,
        file_links: BTreeMap<String, String>,
    ) -> Result<(), CrawlError> {
        let entry = PageInfo {
            url: url.to_string(),
            file_path: file_path.to_string(),
            file_links,
            date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let mut entries = self.entries();
        match entries.iter_mut().find(|e| e.url == url) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries).map_err(|e| CrawlError::Ledger {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Loads the current entries; absent or corrupt files yield an empty list
    pub fn entries(&self) -> Vec<PageInfo> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Ledger {} is unparseable ({}), starting over with an empty ledger",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn links(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_record_creates_file_with_one_entry() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("pages.json"));

        ledger
            .record(
                "https://example.com/a",
                "out/a.md",
                links(&[("https://example.com/r.pdf", "Report")]),
            )
            .unwrap();

        let entries = ledger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/a");
        assert_eq!(entries[0].file_path, "out/a.md");
        assert_eq!(
            entries[0].file_links.get("https://example.com/r.pdf"),
            Some(&"Report".to_string())
        );
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("pages.json"));

        ledger
            .record("https://example.com/a", "out/first.md", links(&[]))
            .unwrap();
        ledger
            .record("https://example.com/b", "out/b.md", links(&[]))
            .unwrap();
        ledger
            .record("https://example.com/a", "out/second.md", links(&[]))
            .unwrap();

        let entries = ledger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://example.com/a");
        assert_eq!(entries[0].file_path, "out/second.md");
        assert_eq!(entries[1].url, "https://example.com/b");
    }

    #[test]
    fn test_corrupt_ledger_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, "{ not json").unwrap();

        let ledger = Ledger::new(&path);
        assert!(ledger.entries().is_empty());

        ledger
            .record("https://example.com/a", "out/a.md", links(&[]))
            .unwrap();
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("absent.json"));
        assert!(ledger.entries().is_empty());
    }
}
