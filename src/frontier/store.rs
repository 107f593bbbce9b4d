//! Durable frontier state: four line-oriented URL sets
//!
//! The crawl frontier is persisted as four plain-text files under the state
//! directory, one URL per line: crawled, uncrawled (pending page visits),
//! downloaded, and undownloaded (pending file fetches). Files are loaded
//! verbatim at startup when resuming and overwritten unconditionally at save.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const CRAWLED_FILE: &str = "crawled_urls.txt";
const UNCRAWLED_FILE: &str = "uncrawled_urls.txt";
const DOWNLOADED_FILE: &str = "downloaded_urls.txt";
const UNDOWNLOADED_FILE: &str = "undownloaded_urls.txt";

/// The four URL sets making up the crawl frontier
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrontierState {
    /// Page URLs that have been fully processed this run or a prior one
    pub crawled: HashSet<String>,

    /// Page URLs discovered but not yet processed
    pub uncrawled: HashSet<String>,

    /// File URLs whose bytes have been written to disk
    pub downloaded: HashSet<String>,

    /// File URLs discovered but not yet (successfully) downloaded
    pub undownloaded: HashSet<String>,
}

impl FrontierState {
    /// Loads frontier state from the four files under `state_dir`
    ///
    /// With `resume` disabled all four sets start empty regardless of any
    /// on-disk file. Under resume, a missing file yields an empty set rather
    /// than an error, and every non-empty line is taken as a literal URL.
    pub fn load(state_dir: &Path, resume: bool) -> Self {
        if !resume {
            return Self::default();
        }

        Self {
            crawled: load_url_set(&state_dir.join(CRAWLED_FILE)),
            uncrawled: load_url_set(&state_dir.join(UNCRAWLED_FILE)),
            downloaded: load_url_set(&state_dir.join(DOWNLOADED_FILE)),
            undownloaded: load_url_set(&state_dir.join(UNDOWNLOADED_FILE)),
        }
    }

    /// Overwrites all four state files under `state_dir`
    pub fn save(&self, state_dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(state_dir)?;
        save_url_set(&self.crawled, &state_dir.join(CRAWLED_FILE))?;
        save_url_set(&self.uncrawled, &state_dir.join(UNCRAWLED_FILE))?;
        save_url_set(&self.downloaded, &state_dir.join(DOWNLOADED_FILE))?;
        save_url_set(&self.undownloaded, &state_dir.join(UNDOWNLOADED_FILE))?;
        Ok(())
    }
}

fn load_url_set(path: &PathBuf) -> HashSet<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Err(_) => HashSet::new(),
    }
}

fn save_url_set(urls: &HashSet<String>, path: &PathBuf) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    for url in urls {
        writeln!(file, "{}", url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> FrontierState {
        let mut state = FrontierState::default();
        state.crawled.insert("https://example.com/a".to_string());
        state.crawled.insert("https://example.com/b".to_string());
        state.uncrawled.insert("https://example.com/c".to_string());
        state
            .downloaded
            .insert("https://example.com/x.pdf".to_string());
        state
            .undownloaded
            .insert("https://example.com/y.zip".to_string());
        state
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = sample_state();
        state.save(dir.path()).unwrap();

        let loaded = FrontierState::load(dir.path(), true);
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_without_resume_is_empty() {
        let dir = TempDir::new().unwrap();
        sample_state().save(dir.path()).unwrap();

        let loaded = FrontierState::load(dir.path(), false);
        assert_eq!(loaded, FrontierState::default());
    }

    #[test]
    fn test_load_missing_files_yields_empty_sets() {
        let dir = TempDir::new().unwrap();
        let loaded = FrontierState::load(dir.path(), true);
        assert_eq!(loaded, FrontierState::default());
    }

    #[test]
    fn test_malformed_lines_kept_as_literal_urls() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CRAWLED_FILE),
            "https://example.com/a\nnot a url at all\n\n  spaced  \n",
        )
        .unwrap();

        let loaded = FrontierState::load(dir.path(), true);
        assert!(loaded.crawled.contains("https://example.com/a"));
        assert!(loaded.crawled.contains("not a url at all"));
        assert!(loaded.crawled.contains("spaced"));
        assert_eq!(loaded.crawled.len(), 3);
    }

    #[test]
    fn test_save_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        sample_state().save(dir.path()).unwrap();

        let mut smaller = FrontierState::default();
        smaller.crawled.insert("https://example.com/only".to_string());
        smaller.save(dir.path()).unwrap();

        let loaded = FrontierState::load(dir.path(), true);
        assert_eq!(loaded.crawled.len(), 1);
        assert!(loaded.uncrawled.is_empty());
    }
}
