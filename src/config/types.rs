use serde::Deserialize;

/// Main configuration structure for Sitemark
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub domains: DomainsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The URL the crawl starts from (required, non-empty)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum depth to crawl from the base URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent worker tasks
    #[serde(rename = "num-workers", default = "default_num_workers")]
    pub num_workers: u32,

    /// Pause between processed items per worker (milliseconds)
    #[serde(rename = "yield-ms", default = "default_yield_ms")]
    pub yield_ms: u64,

    /// Resume from persisted frontier state instead of starting fresh
    #[serde(default)]
    pub resume: bool,
}

/// Page scoping and conversion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Comma-delimited tag names bounding the content region
    #[serde(rename = "content-tags", default = "default_content_tags")]
    pub content_tags: String,

    /// Comma-delimited tag names bounding the link-search region
    #[serde(rename = "link-tags", default = "default_link_tags")]
    pub link_tags: String,

    /// Keep only links whose host equals the base host
    #[serde(rename = "domain-match", default = "default_true")]
    pub domain_match: bool,

    /// Keep only links whose path contains the base path
    #[serde(rename = "path-match", default)]
    pub path_match: bool,

    /// Drop links ending in common raster-image extensions
    #[serde(rename = "exclude-image-links", default = "default_true")]
    pub exclude_image_links: bool,

    /// Render anchors in the converted markdown (discovery is unaffected)
    #[serde(rename = "md-with-links", default)]
    pub md_with_links: bool,
}

/// Output path configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for converted markdown documents
    #[serde(rename = "markdown-dir")]
    pub markdown_dir: String,

    /// Directory for downloaded files, one subdirectory per category
    #[serde(rename = "download-dir")]
    pub download_dir: String,

    /// Directory for the four frontier state files
    #[serde(rename = "state-dir")]
    pub state_dir: String,

    /// Path to the JSON page-info ledger
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,

    /// Sidecar file appending URLs that returned no fetchable content
    #[serde(rename = "no-content-log", default = "default_no_content_log")]
    pub no_content_log: String,

    /// Optional JSON file overriding the built-in file-type taxonomy
    #[serde(rename = "file-types-path", default)]
    pub file_types_path: Option<String>,
}

/// Related-domain discovery and batch-crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DomainsConfig {
    /// Maximum breadth-first level for the discovery scan
    #[serde(rename = "max-level", default = "default_domain_max_level")]
    pub max_level: u32,

    /// Trailing host labels two hosts must share to count as related
    /// (2 keeps `docs.example.edu` with `www.example.edu`)
    #[serde(rename = "suffix-parts", default = "default_suffix_parts")]
    pub suffix_parts: usize,

    /// Where the discovered-domain list is written; defaults to
    /// `domains.json` under the state directory
    #[serde(rename = "domains-path", default)]
    pub domains_path: Option<String>,

    /// Sidecar listing domains a batch run has already crawled; defaults to
    /// `processed_domains.txt` under the state directory
    #[serde(rename = "processed-log", default)]
    pub processed_log: Option<String>,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            max_level: default_domain_max_level(),
            suffix_parts: default_suffix_parts(),
            domains_path: None,
            processed_log: None,
        }
    }
}

impl ScopeConfig {
    /// Splits the comma-delimited content tag option into a list
    pub fn content_tag_list(&self) -> Vec<String> {
        split_tags(&self.content_tags)
    }

    /// Splits the comma-delimited link tag option into a list
    pub fn link_tag_list(&self) -> Vec<String> {
        split_tags(&self.link_tags)
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            content_tags: default_content_tags(),
            link_tags: default_link_tags(),
            domain_match: true,
            path_match: false,
            exclude_image_links: true,
            md_with_links: false,
        }
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn default_max_depth() -> u32 {
    10
}

fn default_num_workers() -> u32 {
    2
}

fn default_yield_ms() -> u64 {
    50
}

fn default_content_tags() -> String {
    "article,div,main,p".to_string()
}

fn default_link_tags() -> String {
    "body".to_string()
}

fn default_no_content_log() -> String {
    "no_content_urls.txt".to_string()
}

fn default_domain_max_level() -> u32 {
    3
}

fn default_suffix_parts() -> usize {
    2
}

fn default_true() -> bool {
    true
}
