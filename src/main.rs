//! forocoches-feed main entry point
//!
//! Runs one harvest and prints every item as a JSON line on stdout.

use clap::Parser;
use forocoches_feed::config::{load_config_with_hash, validate, Config, ListingFormat};
use forocoches_feed::{query, ConfigError};
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// forocoches-feed: recent posts from forocoches.com
///
/// Samples a few sub-forums, reads their most recently active threads and
/// prints every post published within the age window, newest first per thread.
#[derive(Parser, Debug)]
#[command(name = "forocoches-feed")]
#[command(version)]
#[command(about = "Harvest recent forocoches.com posts as JSON lines", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Harvest limits as a JSON object, replacing the file's [scraper] section
    #[arg(long, value_name = "JSON")]
    parameters: Option<String>,

    /// Oldest post age accepted, in seconds
    #[arg(long, value_name = "N")]
    max_oldness_seconds: Option<u64>,

    /// Stop after this many items
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// Skip posts shorter than this many characters
    #[arg(long, value_name = "N")]
    min_post_length: Option<usize>,

    /// Read the homepage's latest-threads table instead of sub-forums
    #[arg(long)]
    legacy: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(raw) = &cli.parameters {
        config = apply_parameters(config, raw)?;
    }
    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let mut items = match query(config).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    let stdout = std::io::stdout();
    while let Some(item) = items.next().await {
        let line = serde_json::to_string(&item)?;
        let mut out = stdout.lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
    }

    Ok(())
}

/// Reads `--parameters` into the configuration
fn apply_parameters(config: Config, raw: &str) -> Result<Config, ConfigError> {
    let parameters: serde_json::Value = serde_json::from_str(raw)?;
    config.with_parameters(&parameters)
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seconds) = cli.max_oldness_seconds {
        config.scraper.max_oldness_seconds = seconds;
    }
    if let Some(max_items) = cli.max_items {
        config.scraper.maximum_items_to_collect = max_items;
    }
    if let Some(min_length) = cli.min_post_length {
        config.scraper.min_post_length = min_length;
    }
    if cli.legacy {
        config.site.listing = ListingFormat::Legacy;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forocoches_feed=info,warn"),
            1 => EnvFilter::new("forocoches_feed=debug,info"),
            2 => EnvFilter::new("forocoches_feed=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
