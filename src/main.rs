//! Sitemark main entry point
//!
//! This is the command-line interface for the Sitemark site-to-markdown
//! crawler.

use clap::Parser;
use std::path::{Path, PathBuf};
use sitemark::config::load_config;
use sitemark::crawler::{crawl, has_saved_state};
use tracing_subscriber::EnvFilter;

/// Sitemark: a site-to-markdown crawler
///
/// Sitemark walks a website breadth-first from a base URL, converts each
/// page's relevant content to a markdown document, downloads referenced
/// files into per-category directories, and persists its frontier so an
/// interrupted crawl can resume where it left off.
#[derive(Parser, Debug)]
#[command(name = "sitemark")]
#[command(version = "1.0.0")]
#[command(about = "A site-to-markdown crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from persisted frontier state
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, ignoring previous state
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show counts from the ledger and persisted state, then exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Discover related domains, write the domain list, and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "all_domains"])]
    discover_domains: bool,

    /// Crawl every discovered related domain into its own output directory
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "discover_domains"])]
    all_domains: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Command-line flags override the config file's resume setting
    if cli.resume {
        config.crawler.resume = true;
    } else if cli.fresh {
        config.crawler.resume = false;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config);
    } else if cli.discover_domains {
        handle_discover(&config).await?;
    } else if cli.all_domains {
        handle_all_domains(&config).await?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemark=info,warn"),
            1 => EnvFilter::new("sitemark=debug,info"),
            2 => EnvFilter::new("sitemark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &sitemark::Config) {
    println!("=== Sitemark Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.num_workers);
    println!("  Yield between pages: {}ms", config.crawler.yield_ms);
    println!("  Resume: {}", config.crawler.resume);

    println!("\nScope:");
    println!("  Content tags: {:?}", config.scope.content_tag_list());
    println!("  Link tags: {:?}", config.scope.link_tag_list());
    println!("  Domain match: {}", config.scope.domain_match);
    println!("  Path match: {}", config.scope.path_match);
    println!("  Exclude image links: {}", config.scope.exclude_image_links);
    println!("  Markdown keeps links: {}", config.scope.md_with_links);

    println!("\nOutput:");
    println!("  Markdown: {}", config.output.markdown_dir);
    println!("  Downloads: {}", config.output.download_dir);
    println!("  State: {}", config.output.state_dir);
    println!("  Ledger: {}", config.output.ledger_path);
    if let Some(path) = &config.output.file_types_path {
        println!("  File types: {}", path);
    }

    println!("\n✓ Configuration is valid");
    let state_dir = Path::new(&config.output.state_dir);
    if config.crawler.resume && has_saved_state(state_dir) {
        let state = sitemark::FrontierState::load(state_dir, true);
        println!(
            "✓ Would resume: {} pages pending, {} already crawled",
            state.uncrawled.len(),
            state.crawled.len()
        );
    } else {
        println!("✓ Would start fresh from {}", config.crawler.base_url);
    }
}

/// Handles the --stats mode: shows counts from the ledger and persisted state
fn handle_stats(config: &sitemark::Config) {
    let ledger = sitemark::ledger::Ledger::new(&config.output.ledger_path);
    let entries = ledger.entries();
    let file_link_count: usize = entries.iter().map(|e| e.file_links.len()).sum();

    println!("Ledger: {}", config.output.ledger_path);
    println!("  Pages recorded: {}", entries.len());
    println!("  File links recorded: {}", file_link_count);

    let state = sitemark::FrontierState::load(Path::new(&config.output.state_dir), true);
    println!("\nState: {}", config.output.state_dir);
    println!("  Crawled: {}", state.crawled.len());
    println!("  Pending pages: {}", state.uncrawled.len());
    println!("  Downloaded: {}", state.downloaded.len());
    println!("  Pending files: {}", state.undownloaded.len());
}

/// Handles the --discover-domains mode: scan for related domains and exit
async fn handle_discover(config: &sitemark::Config) -> Result<(), Box<dyn std::error::Error>> {
    match sitemark::domains::discover_to_file(config).await {
        Ok(count) => {
            println!("✓ {} related domains recorded", count);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Domain discovery failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --all-domains mode: batch-crawl every discovered domain
async fn handle_all_domains(config: &sitemark::Config) -> Result<(), Box<dyn std::error::Error>> {
    match sitemark::domains::run_batch(config).await {
        Ok(crawled) => {
            tracing::info!("Batch finished: {} domains crawled", crawled);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Batch crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &sitemark::Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.crawler.resume {
        tracing::info!("Resuming from persisted state where available");
    } else {
        tracing::info!("Starting fresh crawl");
    }

    match crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} pages, {} files",
                summary.pages_crawled,
                summary.files_downloaded
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
