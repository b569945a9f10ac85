//! Keyword Crawler main entry point
//!
//! This is the command-line interface for the keyword crawler.

use anyhow::Context;
use clap::Parser;
use keyword_crawler::checkpoint::CheckpointManager;
use keyword_crawler::config::{load_config_with_hash, validate, Config, ResultsFormat};
use keyword_crawler::output::{
    export_pages, print_checkpoint_list, print_crawl_report, print_page_list, print_statistics,
    write_results,
};
use keyword_crawler::scoring::{parse_keyword_input, Scorer};
use keyword_crawler::seeds::resolve_seeds;
use keyword_crawler::storage::{open_storage, Storage};
use keyword_crawler::Coordinator;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Results shown on the terminal after a crawl
const REPORT_LIMIT: usize = 10;

/// Sessions listed by --stats
const STATS_SESSIONS: usize = 5;

/// Keyword Crawler: a polite, keyword-driven web crawler
///
/// Crawls breadth-first from seed URLs, scores every page against a keyword
/// set, respects robots.txt and per-domain rate limits, and checkpoints its
/// state so an interrupted crawl can be resumed.
#[derive(Parser, Debug)]
#[command(name = "keyword-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite, keyword-driven web crawler", long_about = None)]
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

    /// Resume from a checkpoint file
    #[arg(long, value_name = "PATH")]
    resume_from: Option<PathBuf>,

    /// Keywords, comma or space separated (overrides the config file)
    #[arg(long)]
    keywords: Option<String>,

    /// Seed URLs, comma or space separated (overrides the config file)
    #[arg(long)]
    seed_urls: Option<String>,

    /// Maximum link depth (overrides the config file)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "recent", "list_checkpoints", "export", "vacuum"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "recent", "list_checkpoints", "export", "vacuum"])]
    stats: bool,

    /// Show the most recently stored pages and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "list_checkpoints", "export", "vacuum"])]
    recent: bool,

    /// List checkpoint files and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "recent", "export", "vacuum"])]
    list_checkpoints: bool,

    /// Export stored pages from the database to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats", "recent", "list_checkpoints", "vacuum"])]
    export: Option<PathBuf>,

    /// Format for --export
    #[arg(long, value_enum, default_value_t = ResultsFormat::Json, requires = "export")]
    export_format: ResultsFormat,

    /// Maximum number of pages for --export and --recent
    #[arg(long, default_value_t = 1000)]
    limit: usize,

    /// Pages to skip for --recent
    #[arg(long, default_value_t = 0, requires = "recent")]
    offset: usize,

    /// Minimum relevance score for --export
    #[arg(long, default_value_t = 0.0, requires = "export")]
    min_score: f64,

    /// Compact the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "recent", "list_checkpoints", "export"])]
    vacuum: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.recent {
        handle_recent(&config, cli.limit, cli.offset)?;
    } else if cli.list_checkpoints {
        handle_list_checkpoints(&config)?;
    } else if let Some(path) = &cli.export {
        handle_export(&config, path, cli.export_format, cli.limit, cli.min_score)?;
    } else if cli.vacuum {
        handle_vacuum(&config)?;
    } else {
        handle_crawl(config, &config_hash, cli.resume_from.as_deref()).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("keyword_crawler=info,warn"),
            1 => EnvFilter::new("keyword_crawler=debug,info"),
            2 => EnvFilter::new("keyword_crawler=trace,debug"),
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

fn split_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies command-line overrides on top of the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(keywords) = &cli.keywords {
        config.crawler.keywords = parse_keyword_input(keywords);
    }
    if let Some(seeds) = &cli.seed_urls {
        config.crawler.seed_urls = split_list(seeds);
    }
    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
}

fn database_path(config: &Config) -> anyhow::Result<&Path> {
    config
        .output
        .database_path
        .as_deref()
        .map(Path::new)
        .context("output.database-path is not set in the configuration")
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let scorer = Scorer::from_settings(&config.crawler.keywords, &config.matching)
        .context("Invalid relevance pattern")?;

    println!("=== Keyword Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Keywords: {}", config.crawler.keywords.join(", "));
    println!("  Scoring: {}", scorer.name());
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nDomains:");
    println!("  Stay in seed domains: {}", config.domains.stay_in_domain);
    println!("  Allowed: {}", config.domains.allowed.join(", "));
    println!("  Excluded: {}", config.domains.excluded.join(", "));

    println!("\nCheckpoints:");
    println!("  Directory: {}", config.checkpoint.directory);
    println!(
        "  Interval: {}s",
        config.checkpoint.effective_interval().as_secs()
    );

    println!("\nOutput:");
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Results: {}",
        config.output.results_path.as_deref().unwrap_or("(none)")
    );

    println!("\nSeed URLs ({}):", config.crawler.seed_urls.len());
    for seed in &config.crawler.seed_urls {
        println!("  - {}", seed);
    }
    if config.crawler.seed_urls.is_empty() {
        if config.seed_suggestion.enabled {
            println!("  (none; would ask {} for suggestions)", config.seed_suggestion.endpoint);
        } else {
            println!("  (none; would use default seed URLs)");
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = database_path(config)?;
    println!("Database: {}\n", path.display());

    let storage = open_storage(path).context("Failed to open database")?;
    let stats = storage.get_statistics()?;
    let sessions = storage.get_sessions(STATS_SESSIONS, 0)?;

    print_statistics(&stats, &sessions);
    Ok(())
}

/// Handles the --recent mode: lists the newest stored pages
fn handle_recent(config: &Config, limit: usize, offset: usize) -> anyhow::Result<()> {
    let storage = open_storage(database_path(config)?).context("Failed to open database")?;
    let pages = storage.get_recent_pages(limit, offset)?;

    print_page_list("Recently Crawled Pages", &pages, offset);
    Ok(())
}

/// Handles the --list-checkpoints mode
fn handle_list_checkpoints(config: &Config) -> anyhow::Result<()> {
    let manager = CheckpointManager::new(&config.checkpoint.directory);
    let checkpoints = manager
        .list()
        .with_context(|| format!("Failed to list {}", manager.directory().display()))?;

    print_checkpoint_list(&checkpoints);
    Ok(())
}

/// Handles the --export mode: writes stored pages to a file
fn handle_export(
    config: &Config,
    output: &Path,
    format: ResultsFormat,
    limit: usize,
    min_score: f64,
) -> anyhow::Result<()> {
    let storage = open_storage(database_path(config)?).context("Failed to open database")?;
    let pages = storage.get_relevant_pages(limit, 0, min_score)?;

    let written = export_pages(output, &pages, format)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Exported {} pages to: {}", written, output.display());
    Ok(())
}

/// Handles the --vacuum mode
fn handle_vacuum(config: &Config) -> anyhow::Result<()> {
    let path = database_path(config)?;
    let mut storage = open_storage(path).context("Failed to open database")?;
    storage.vacuum()?;

    println!("✓ Database compacted: {}", path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    mut config: Config,
    config_hash: &str,
    resume_from: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    // A failed resume falls back to these seeds
    config.crawler.seed_urls = resolve_seeds(
        &config.crawler.seed_urls,
        &config.crawler.keywords,
        &config.seed_suggestion,
    )
    .await;

    let mut coordinator = Coordinator::new(&config)?;

    if let Some(path) = config.output.database_path.as_deref() {
        let storage = open_storage(Path::new(path))?;
        coordinator = coordinator.with_storage(Box::new(storage), config_hash);
    }

    if let Some(path) = resume_from {
        if let Err(e) = coordinator.resume(path) {
            tracing::error!(
                "Failed to resume from {}: {}; starting a fresh crawl",
                path.display(),
                e
            );
        }
    }

    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if shutdown.swap(true, Ordering::SeqCst) {
                tracing::warn!("Shutdown already in progress");
            } else {
                tracing::warn!("Interrupt received, stopping after the current page");
            }
        }
    });

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_crawl_report(&report, REPORT_LIMIT);

    if let Some(path) = config.output.results_path.as_deref() {
        write_results(
            Path::new(path),
            &report.results,
            config.output.results_format,
            config.output.pretty_print,
            config.output.include_content,
        )?;
        println!("\n✓ Results written to: {}", path);
    }

    Ok(())
}
