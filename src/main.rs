//! Sitemap-Sweep main entry point
//!
//! This is the command-line interface for the sitemap-to-CSV extractor.

use clap::Parser;
use sitemap_sweep::config::{load_config, validate, Config};
use sitemap_sweep::crawler::crawl;
use sitemap_sweep::output::{print_statistics, save_to_csv};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitemap-Sweep: extract sitemap URLs with metadata to CSV
///
/// Fetches an XML sitemap index, visits every sitemap it references with a
/// polite delay between requests, and writes the per-URL metadata to a CSV
/// file. Individual sitemap failures are counted and reported, never fatal.
#[derive(Parser, Debug)]
#[command(name = "sitemap-sweep")]
#[command(version)]
#[command(about = "Extract sitemap URLs with metadata to CSV", long_about = None)]
struct Cli {
    /// URL or local path of the sitemap index to crawl
    #[arg(value_name = "INDEX_URL")]
    index_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Base URL for resolving relative sitemap references
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Seconds to wait between successive fetches
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Path of the CSV output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration and apply command-line overrides
    let config = build_config(&cli)?;

    // Run the crawl; per-document failures surface in the statistics
    let (records, stats) = crawl(&config, &cli.index_url).await?;

    // Write the CSV; inability to write the output file is fatal
    save_to_csv(&records, Path::new(&config.output.csv_path))?;

    if !cli.quiet {
        print_statistics(&records, &stats);
    }

    if stats.errors > 0 {
        tracing::warn!("Crawl completed with {} errors", stats.errors);
    } else {
        tracing::info!("Crawl completed successfully");
    }

    // Partial failure is not process failure; only config/IO errors above
    // change the exit code
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_sweep=info,warn"),
            1 => EnvFilter::new("sitemap_sweep=debug,info"),
            2 => EnvFilter::new("sitemap_sweep=trace,debug"),
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

/// Loads the configuration file (or defaults) and applies CLI overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = Some(base_url.clone());
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay = delay;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    // Overrides bypass the file loader, so validate the final shape
    validate(&config)?;

    Ok(config)
}
