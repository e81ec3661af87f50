//! job-harvest main entry point
//!
//! This is the command-line interface for the job-listing harvester. Logs go
//! to stderr; the response JSON is the only thing written to stdout.

use anyhow::Context;
use clap::Parser;
use job_harvest::config::{load_config_with_hash, Config};
use job_harvest::output::{load_statistics, print_statistics};
use job_harvest::sites::SiteRegistry;
use job_harvest::storage::open_storage;
use job_harvest::trigger::{handle_harvest, handle_purge};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// job-harvest: a polite job-listing harvester
///
/// Runs one bounded pass over the configured listing sites, structures each
/// posting and upserts the batch into SQLite, then exits.
#[derive(Parser, Debug)]
#[command(name = "job-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite job-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Harvest only this site (freelance-start, lancers, crowdworks)
    #[arg(long, value_name = "ID", conflicts_with = "request")]
    site: Option<String>,

    /// Raw JSON request body, e.g. '{"site":"lancers"}'
    #[arg(long, value_name = "JSON")]
    request: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["stats", "purge"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "purge"])]
    stats: bool,

    /// Delete postings older than the retention window and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    purge: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if cli.stats {
        return handle_stats(&config);
    }

    let (success, json) = if cli.purge {
        let response = handle_purge(&config);
        (response.is_success(), response.to_json())
    } else {
        let body = cli.request.or_else(|| {
            cli.site
                .map(|site| serde_json::json!({ "site": site }).to_string())
        });
        let response = handle_harvest(&config, body.as_deref()).await;
        (response.is_success(), response.to_json())
    };

    println!("{}", json);

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_harvest=info,warn"),
            1 => EnvFilter::new("job_harvest=debug,info"),
            2 => EnvFilter::new("job_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and sites
fn handle_dry_run(config: &Config) {
    let harvester = &config.harvester;

    println!("=== job-harvest Dry Run ===\n");

    println!("Harvester Configuration:");
    println!("  Detail concurrency: {}", harvester.detail_concurrency);
    println!("  Max total items: {}", harvester.max_total_items);
    println!(
        "  Timeouts: listing {}ms, detail {}ms",
        harvester.list_timeout_ms, harvester.detail_timeout_ms
    );
    println!(
        "  Retries: {} (backoff base {}ms)",
        harvester.fetch_retries, harvester.backoff_base_ms
    );
    println!("  Chunk size: {}", harvester.chunk_size);
    println!("  Page delay: {}ms", harvester.page_delay_ms);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Retention: {} days", config.retention.days_to_keep);

    let registry = SiteRegistry::from_config(config);
    println!("\nSites ({}):", registry.sites().len());
    for site in registry.sites() {
        println!(
            "  - {} (pages {:?}, up to {} items per page)",
            site.id, site.pages, site.max_items_per_page
        );
        println!("    * {}", site.base_url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}
