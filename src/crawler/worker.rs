//! Crawl workers
//!
//! Each worker loops over the shared work queue: claim a page, fetch it, run
//! the blocking pipeline, write the markdown document, record the ledger
//! entry, download file links, and enqueue newly discovered pages one level
//! deeper. A per-page failure is logged and the worker moves on; workers only
//! exit when the queue is empty and no peer still has an item in flight.

use crate::crawler::fetcher::{fetch_page, FetchOutcome};
use crate::crawler::pipeline::{partition_links, process_html, PageSettings};
use crate::download::download_files;
use crate::extract::Taxonomy;
use crate::frontier::{Frontier, WorkItem, WorkQueue};
use crate::ledger::Ledger;
use crate::CrawlError;
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// How long an idle worker waits before re-checking the queue
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Shared state for one crawl run
pub struct CrawlContext {
    pub settings: PageSettings,
    pub max_depth: u32,
    pub yield_ms: u64,
    pub markdown_dir: PathBuf,
    pub download_dir: PathBuf,
    pub no_content_path: PathBuf,
    pub taxonomy: Taxonomy,
    pub frontier: Frontier,
    pub queue: WorkQueue,
    pub ledger: tokio::sync::Mutex<Ledger>,
    pub client: Client,
}

/// Runs one worker until the whole crawl is drained
pub async fn run_worker(ctx: Arc<CrawlContext>, worker_id: usize) {
    tracing::debug!("Worker {} started", worker_id);

    loop {
        let Some(item) = ctx.queue.pop() else {
            if ctx.queue.is_idle() {
                break;
            }
            // A peer may still enqueue children of its in-flight page
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };

        if let Err(e) = crawl_one(&ctx, &item).await {
            tracing::error!("Worker {}: failed to process {}: {}", worker_id, item.url, e);
        }
        ctx.queue.complete();

        if ctx.yield_ms > 0 {
            tokio::time::sleep(Duration::from_millis(ctx.yield_ms)).await;
        }
    }

    tracing::debug!("Worker {} finished", worker_id);
}

async fn crawl_one(ctx: &Arc<CrawlContext>, item: &WorkItem) -> Result<(), CrawlError> {
    if !ctx.frontier.claim_page(&item.url) {
        tracing::debug!("Already crawled, skipping: {}", item.url);
        return Ok(());
    }

    tracing::info!("Crawling (depth {}): {}", item.depth, item.url);

    let body = match fetch_page(&ctx.client, &item.url).await {
        FetchOutcome::Html { body } => body,
        outcome => {
            tracing::info!("No usable content for {}: {:?}", item.url, outcome);
            append_line(&ctx.no_content_path, &item.url).await?;
            return Ok(());
        }
    };

    let page_url = Url::parse(&item.url)?;
    let shared = Arc::clone(ctx);
    let artifacts = tokio::task::spawn_blocking(move || {
        process_html(&page_url, &body, &shared.settings, &shared.taxonomy)
    })
    .await?;

    if artifacts.not_found {
        tracing::info!("Page reports not found, skipping: {}", item.url);
        return Ok(());
    }

    let (file_links, page_links) = partition_links(artifacts.links, &ctx.taxonomy);

    match artifacts.markdown {
        Some(markdown) => {
            let target = ctx
                .markdown_dir
                .join(format!("{}.md", artifacts.document_name));
            tokio::fs::write(&target, markdown).await?;
            tracing::info!("Saved markdown: {}", target.display());

            let link_map: BTreeMap<String, String> = file_links
                .iter()
                .map(|l| (l.url.clone(), l.text.clone()))
                .collect();
            let ledger = ctx.ledger.lock().await;
            ledger.record(&item.url, &target.display().to_string(), link_map)?;
        }
        None => {
            tracing::info!("No content extracted from {}", item.url);
            append_line(&ctx.no_content_path, &item.url).await?;
        }
    }

    ctx.frontier
        .discover_files(file_links.iter().map(|l| l.url.as_str()));
    download_files(
        &ctx.client,
        &ctx.taxonomy,
        &file_links,
        &ctx.download_dir,
        &ctx.frontier,
    )
    .await;

    let fresh = ctx
        .frontier
        .discover_pages(page_links.into_iter().map(|l| l.url).collect());
    if item.depth < ctx.max_depth {
        for url in fresh {
            ctx.queue.push(WorkItem {
                depth: item.depth + 1,
                url,
            });
        }
    } else if !fresh.is_empty() {
        // Recorded for a later run, but past the depth cutoff for this one
        tracing::debug!(
            "Depth limit reached at {}; {} links recorded but not queued",
            item.url,
            fresh.len()
        );
    }

    Ok(())
}

async fn append_line(path: &Path, url: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{}\n", url).as_bytes()).await?;
    Ok(())
}
