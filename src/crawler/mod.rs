//! Crawl orchestration
//!
//! Wires configuration, frontier state, the taxonomy, and the worker pool
//! into one breadth-first run. `crawl` is the library entry point: seed the
//! queue (from persisted state when resuming), spawn the workers, wait for
//! them to drain the site, then persist the frontier for the next run.

mod fetcher;
mod pipeline;
mod worker;

pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use pipeline::{
    derive_document_name, partition_links, process_html, PageArtifacts, PageSettings,
};
pub use worker::{run_worker, CrawlContext};

use crate::config::Config;
use crate::extract::{LinkFilter, Taxonomy};
use crate::frontier::{Frontier, FrontierState, WorkItem, WorkQueue};
use crate::ledger::Ledger;
use crate::{CrawlError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Counts reported after a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages marked crawled, including carry-over from resumed state
    pub pages_crawled: usize,

    /// File URLs whose bytes were written, including carry-over
    pub files_downloaded: usize,

    /// Discovered pages left for a future run (depth cutoff or interruption)
    pub pages_pending: usize,

    /// File URLs still awaiting a successful download
    pub files_pending: usize,
}

/// Runs a full crawl described by `config`
pub async fn crawl(config: &Config) -> Result<CrawlSummary> {
    let base_url = Url::parse(&config.crawler.base_url)?;
    let taxonomy = Taxonomy::from_config(config.output.file_types_path.as_deref())?;

    let state_dir = PathBuf::from(&config.output.state_dir);
    let state = FrontierState::load(&state_dir, config.crawler.resume);
    let frontier = Frontier::new(state);
    let queue = WorkQueue::new();

    seed_queue(&frontier, &queue, &base_url, config.crawler.resume);

    let markdown_dir = PathBuf::from(&config.output.markdown_dir);
    let download_dir = PathBuf::from(&config.output.download_dir);
    tokio::fs::create_dir_all(&markdown_dir).await?;
    tokio::fs::create_dir_all(&download_dir).await?;
    tokio::fs::create_dir_all(&state_dir).await?;

    let ctx = Arc::new(CrawlContext {
        settings: PageSettings {
            base_url,
            content_tags: config.scope.content_tag_list(),
            link_tags: config.scope.link_tag_list(),
            filter: LinkFilter {
                domain_match: config.scope.domain_match,
                path_match: config.scope.path_match,
                exclude_images: config.scope.exclude_image_links,
            },
            md_with_links: config.scope.md_with_links,
        },
        max_depth: config.crawler.max_depth,
        yield_ms: config.crawler.yield_ms,
        markdown_dir,
        download_dir,
        no_content_path: state_dir.join(&config.output.no_content_log),
        taxonomy,
        frontier,
        queue,
        ledger: tokio::sync::Mutex::new(Ledger::new(&config.output.ledger_path)),
        client: build_http_client()?,
    });

    tracing::info!(
        "Starting crawl of {} with {} workers (max depth {})",
        config.crawler.base_url,
        config.crawler.num_workers,
        config.crawler.max_depth
    );

    let mut handles = Vec::new();
    for worker_id in 0..config.crawler.num_workers as usize {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(run_worker(ctx, worker_id)));
    }
    for handle in handles {
        handle.await.map_err(CrawlError::Worker)?;
    }

    ctx.frontier
        .save(&state_dir)
        .map_err(CrawlError::Io)?;

    let summary = summarize(&ctx.frontier);
    tracing::info!(
        "Crawl finished: {} pages crawled, {} files downloaded, {} pages pending, {} files pending",
        summary.pages_crawled,
        summary.files_downloaded,
        summary.pages_pending,
        summary.files_pending
    );
    Ok(summary)
}

/// Seeds the work queue, preferring persisted frontier state when resuming
fn seed_queue(frontier: &Frontier, queue: &WorkQueue, base_url: &Url, resume: bool) {
    let seeds = if resume {
        frontier.uncrawled_snapshot()
    } else {
        Vec::new()
    };

    if seeds.is_empty() {
        // Fresh start, or a resumed state with nothing left pending
        for url in frontier.discover_pages(vec![base_url.to_string()]) {
            queue.push(WorkItem { depth: 0, url });
        }
    } else {
        tracing::info!("Resuming with {} pending pages", seeds.len());
        for url in seeds {
            queue.push(WorkItem { depth: 0, url });
        }
    }
}

fn summarize(frontier: &Frontier) -> CrawlSummary {
    let state = frontier.snapshot();
    CrawlSummary {
        pages_crawled: state.crawled.len(),
        files_downloaded: state.downloaded.len(),
        pages_pending: state.uncrawled.len(),
        files_pending: state.undownloaded.len(),
    }
}

/// True when a previous run left frontier state behind in `state_dir`
pub fn has_saved_state(state_dir: &Path) -> bool {
    state_dir.join("uncrawled_urls.txt").exists() || state_dir.join("crawled_urls.txt").exists()
}
