//! Shoal main entry point
//!
//! This is the command-line interface for the Shoal crawler.

use anyhow::Context;
use clap::Parser;
use shoal::config::{load_config_with_hash, Config};
use shoal::crawler::crawl;
use shoal::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shoal: a host-partitioned web crawler
///
/// Shoal crawls outward from a set of seed URLs. Every host is admitted
/// through its own queue, which drops duplicate URLs, honours the blacklist,
/// and backs off hosts that answer with server errors.
#[derive(Parser, Debug)]
#[command(name = "shoal")]
#[command(version)]
#[command(about = "A host-partitioned web crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut summary = crawl(&config).await.context("Crawl failed")?;
    summary.config_hash = Some(config_hash);

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shoal=info,warn"),
            1 => EnvFilter::new("shoal=debug,info"),
            2 => EnvFilter::new("shoal=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Shoal Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages
    );
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Idle timeout: {}ms", config.crawler.idle_timeout_ms);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);

    println!("\nFilter:");
    println!("  Request buffer: {}", config.filter.request_buffer);
    println!("  Results buffer: {}", config.filter.results_buffer);
    println!("  Backoff base: {}ms", config.filter.backoff_base_ms);
    match config.filter.max_backoff_ms {
        Some(max) => println!("  Max backoff: {}ms", max),
        None => println!("  Max backoff: unbounded"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\nBlacklisted Hosts ({}):", config.blacklist.len());
    for entry in &config.blacklist {
        println!("  - {}", entry.host);
    }

    println!("\n✓ Configuration is valid");
}
