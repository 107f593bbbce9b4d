//! Related-domain discovery and batch crawling
//!
//! A site often spreads across sibling hosts (`www.example.edu`,
//! `lib.example.edu`, ...). Discovery scans breadth-first from the base URL,
//! keeps links whose host shares the configured suffix with the base host,
//! probes each candidate with a HEAD request (falling back to GET when HEAD
//! is rejected), and records every reachable bare domain root it meets. The
//! resulting list is persisted as JSON; a batch run then crawls each recorded
//! domain into its own subdirectory, appending finished domains to a sidecar
//! so an interrupted batch skips them next time.

use crate::config::Config;
use crate::crawler::{build_http_client, crawl, fetch_page};
use crate::{CrawlError, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use url::Url;

const DOMAINS_FILE: &str = "domains.json";
const PROCESSED_FILE: &str = "processed_domains.txt";

/// One discovered related domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub id: usize,

    /// Bare domain root, trailing slash trimmed
    pub url: String,

    /// Breadth-first level of the page the domain was first seen on
    pub level: u32,

    /// Anchor text of the first link to it, host name when the anchor was
    /// empty
    pub title: String,
}

/// Discovers related domains reachable from the configured base URL
pub async fn discover_domains(
    client: &Client,
    base_url: &Url,
    max_level: u32,
    suffix_parts: usize,
) -> Vec<DomainRecord> {
    let Some(base_host) = base_url.host_str() else {
        return Vec::new();
    };

    let mut visited: HashSet<String> = HashSet::new();
    let mut records: Vec<DomainRecord> = Vec::new();
    let mut queue: VecDeque<(String, u32)> = VecDeque::new();
    queue.push_back((trim_slash(base_url.as_str()), 1));

    while let Some((url, level)) = queue.pop_front() {
        if level > max_level || !visited.insert(url.clone()) {
            continue;
        }
        tracing::info!("Scanning {} at level {}", url, level);

        let Some(body) = fetch_page(client, &url).await.into_body() else {
            continue;
        };

        for (link_url, title) in page_links(&body, &url) {
            let Ok(parsed) = Url::parse(&link_url) else {
                continue;
            };
            let Some(host) = parsed.host_str() else {
                continue;
            };
            if !same_suffix(host, base_host, suffix_parts) {
                continue;
            }

            let trimmed = trim_slash(&link_url);
            if visited.contains(&trimmed) {
                continue;
            }
            if !url_is_reachable(client, &trimmed).await {
                continue;
            }

            queue.push_back((trimmed.clone(), level + 1));
            if is_domain_root(&parsed) {
                upsert_record(&mut records, &trimmed, level, title, host);
            }
        }
    }

    tracing::info!("Discovered {} related domains", records.len());
    records
}

/// Probes a URL with HEAD, retrying with GET when HEAD is refused
///
/// A 404 is conclusively unreachable. Other error statuses get the GET
/// retry, since some servers reject HEAD outright.
pub async fn url_is_reachable(client: &Client, url: &str) -> bool {
    match client.head(url).send().await {
        Ok(response) => {
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return false;
            }
            if status.is_client_error() || status.is_server_error() {
                return get_fallback(client, url).await;
            }
            true
        }
        Err(e) => {
            tracing::debug!("HEAD failed for {}: {}", url, e);
            false
        }
    }
}

async fn get_fallback(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) => response.status().as_u16() < 400,
        Err(e) => {
            tracing::debug!("GET retry failed for {}: {}", url, e);
            false
        }
    }
}

/// Runs discovery and writes the domain list to the configured path
pub async fn discover_to_file(config: &Config) -> Result<usize> {
    let base_url = Url::parse(&config.crawler.base_url)?;
    let client = build_http_client()?;

    let records = discover_domains(
        &client,
        &base_url,
        config.domains.max_level,
        config.domains.suffix_parts,
    )
    .await;

    let path = domains_path(config);
    save_domains(&records, &path)?;
    tracing::info!("Domain list written to {}", path.display());
    Ok(records.len())
}

/// Crawls every discovered domain into its own output subdirectory
///
/// The domain list is loaded from disk, or discovered first when absent.
/// Domains already in the processed sidecar are skipped; a domain is only
/// appended there after its crawl completed, so a failed or interrupted
/// domain is retried by the next batch. Returns the number of domains
/// crawled this run.
pub async fn run_batch(config: &Config) -> Result<usize> {
    let domains_file = domains_path(config);
    let mut records = load_domains(&domains_file);
    if records.is_empty() {
        tracing::info!("No domain list at {}, discovering", domains_file.display());
        let base_url = Url::parse(&config.crawler.base_url)?;
        let client = build_http_client()?;
        records = discover_domains(
            &client,
            &base_url,
            config.domains.max_level,
            config.domains.suffix_parts,
        )
        .await;
        save_domains(&records, &domains_file)?;
    }

    let processed_file = processed_log_path(config);
    let processed = load_processed(&processed_file);

    let mut crawled = 0;
    for record in &records {
        if processed.contains(&record.url) {
            tracing::info!("Domain already processed, skipping: {}", record.url);
            continue;
        }

        let domain_config = domain_config(config, record);
        tracing::info!("Crawling domain {} ({})", record.title, record.url);
        match crawl(&domain_config).await {
            Ok(summary) => {
                crawled += 1;
                tracing::info!(
                    "Domain {} done: {} pages, {} files",
                    record.url,
                    summary.pages_crawled,
                    summary.files_downloaded
                );
                mark_processed(&processed_file, &record.url)?;
            }
            Err(e) => {
                tracing::error!("Domain crawl failed for {}: {}", record.url, e);
            }
        }
    }

    Ok(crawled)
}

/// Loads a previously written domain list; absent or corrupt files are empty
pub fn load_domains(path: &Path) -> Vec<DomainRecord> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                "Domain list {} is unparseable ({}), treating as empty",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Writes the domain list as pretty-printed JSON
pub fn save_domains(records: &[DomainRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records).map_err(|e| CrawlError::Domains {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Derives the per-domain configuration for one batch entry
///
/// Every output location gains a subdirectory named after the domain's
/// title, so parallel domains never share markdown, download, state, or
/// ledger files.
fn domain_config(config: &Config, record: &DomainRecord) -> Config {
    let dir = domain_dir_name(record);
    let mut derived = config.clone();
    derived.crawler.base_url = record.url.clone();
    derived.output.markdown_dir = join_under(&config.output.markdown_dir, &dir);
    derived.output.download_dir = join_under(&config.output.download_dir, &dir);
    derived.output.state_dir = join_under(&config.output.state_dir, &dir);

    let ledger = Path::new(&config.output.ledger_path);
    let file_name = ledger
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pages.json".to_string());
    let parent = ledger.parent().unwrap_or_else(|| Path::new("."));
    derived.output.ledger_path = parent.join(&dir).join(file_name).display().to_string();

    derived
}

/// Directory name for a domain: its title, made a single path component
fn domain_dir_name(record: &DomainRecord) -> String {
    let title = record.title.trim().replace('/', "_");
    if !title.is_empty() {
        return title;
    }
    Url::parse(&record.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| format!("domain-{}", record.id))
}

fn join_under(base: &str, dir: &str) -> String {
    Path::new(base).join(dir).display().to_string()
}

fn domains_path(config: &Config) -> PathBuf {
    match &config.domains.domains_path {
        Some(path) => PathBuf::from(path),
        None => Path::new(&config.output.state_dir).join(DOMAINS_FILE),
    }
}

fn processed_log_path(config: &Config) -> PathBuf {
    match &config.domains.processed_log {
        Some(path) => PathBuf::from(path),
        None => Path::new(&config.output.state_dir).join(PROCESSED_FILE),
    }
}

fn load_processed(path: &Path) -> HashSet<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Err(_) => HashSet::new(),
    }
}

fn mark_processed(path: &Path, url: &str) -> std::io::Result<()> {
    use std::io::Write;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}", url)?;
    Ok(())
}

/// All anchors on a page, resolved against the page's own URL
fn page_links(body: &str, page_url: &str) -> Vec<(String, String)> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(body);
    let mut out = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let Some(host) = resolved.host_str() else {
            continue;
        };
        let text: String = anchor.text().map(str::trim).collect();
        let title = if text.is_empty() {
            host.to_string()
        } else {
            text
        };
        out.push((resolved.to_string(), title));
    }
    out
}

/// Whether two hosts share their trailing `parts` labels
fn same_suffix(host: &str, base_host: &str, parts: usize) -> bool {
    host_suffix(host, parts) == host_suffix(base_host, parts)
}

fn host_suffix(host: &str, parts: usize) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(parts);
    labels[start..].join(".")
}

/// A bare domain root: no meaningful path, no query, no fragment
fn is_domain_root(url: &Url) -> bool {
    (url.path().is_empty() || url.path() == "/")
        && url.query().is_none()
        && url.fragment().is_none()
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn upsert_record(
    records: &mut Vec<DomainRecord>,
    url: &str,
    level: u32,
    title: String,
    host: &str,
) {
    match records.iter_mut().find(|r| r.url == url) {
        Some(existing) => {
            // Upgrade the host-name placeholder once a real anchor text shows up
            if existing.title == host && title != host {
                existing.title = title;
            }
        }
        None => {
            tracing::info!("Recording domain {} ({})", url, title);
            records.push(DomainRecord {
                id: records.len() + 1,
                url: url.to_string(),
                level,
                title,
            });
        }
    }
}
