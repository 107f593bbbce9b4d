//! Sitemark: a site-to-markdown crawler
//!
//! This crate implements a breadth-first website crawler that converts each
//! page's relevant content to markdown, classifies and downloads referenced
//! document files, and persists enough state to resume an interrupted crawl.

pub mod config;
pub mod crawler;
pub mod domains;
pub mod download;
pub mod extract;
pub mod frontier;
pub mod ledger;
pub mod markdown;

use thiserror::Error;

/// Main error type for Sitemark operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Ledger error at {path}: {source}")]
    Ledger {
        path: String,
        source: serde_json::Error,
    },

    #[error("Domain list error at {path}: {source}")]
    Domains {
        path: String,
        source: serde_json::Error,
    },

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitemark operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlSummary};
pub use domains::DomainRecord;
pub use extract::{ExtractedLink, Taxonomy};
pub use frontier::{Frontier, FrontierState, WorkItem, WorkQueue};
