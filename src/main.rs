//! AMV Harvest main entry point
//!
//! This is the command-line interface for the AMV acquisition pipeline.

use amv_harvest::acquisition::Acquirer;
use amv_harvest::config::{load_config_with_hash, Config};
use amv_harvest::crawler::ListingScraper;
use amv_harvest::dispatch::{dispatch, CommandTorrentClient};
use amv_harvest::library::{check_library, DirectoryScanner};
use amv_harvest::output::{load_statistics, print_records, print_statistics};
use amv_harvest::selector::{parse_specs, select_ids};
use amv_harvest::storage::{open_storage, SqliteStorage};
use amv_harvest::{AmvState, EntryStore};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// AMV Harvest: collects anime music videos from a news site
///
/// Discovers new AMVs on the paginated news listing, downloads the best
/// torrent for each, sends ready torrents to a torrent client, and keeps
/// track of what is already in the local collection.
#[derive(Parser, Debug)]
#[command(name = "amv-harvest")]
#[command(version)]
#[command(about = "AMV discovery and torrent acquisition", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the news listing for new AMVs
    Scrape {
        /// Maximum number of listing pages (estimated when omitted)
        pages: Option<u32>,
    },

    /// Download torrents for one AMV or for all pending ones
    Download {
        /// AMV id (all pending AMVs when omitted)
        id: Option<String>,
    },

    /// Send ready torrents to the torrent client
    Torrent {
        /// Ids or ranges: 12345, 8000-9000, >9000, <500 (all ready when omitted)
        #[arg(allow_hyphen_values = true)]
        specs: Vec<String>,
    },

    /// Mark AMVs found in a library directory as collected
    Checklib {
        /// Library directory
        path: PathBuf,
    },

    /// List AMVs
    List {
        /// Only AMVs in this state (0-3)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=3))]
        state: Option<i64>,
    },

    /// Show counts per lifecycle state
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let mut store = open_storage(&config.storage.database_path).with_context(|| {
        format!(
            "Failed to open database {}",
            config.storage.database_path.display()
        )
    })?;

    match cli.command {
        Command::Scrape { pages } => handle_scrape(&config, &mut store, pages).await,
        Command::Download { id } => handle_download(&config, &mut store, id).await,
        Command::Torrent { specs } => handle_torrent(&config, &mut store, &specs).await,
        Command::Checklib { path } => handle_checklib(&config, &mut store, path),
        Command::List { state } => handle_list(&store, state.and_then(AmvState::from_db_int)),
        Command::Stats => handle_stats(&config, &store),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("amv_harvest=info,warn"),
            1 => EnvFilter::new("amv_harvest=debug,info"),
            2 => EnvFilter::new("amv_harvest=trace,debug"),
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

/// Handles `scrape`: crawls the listing and stores new AMVs
async fn handle_scrape(
    config: &Config,
    store: &mut SqliteStorage,
    pages: Option<u32>,
) -> anyhow::Result<()> {
    println!("Scraping {}", config.site.listing_url());

    let scraper = ListingScraper::new(config)?;
    let summary = scraper.scrape_all(store, pages).await?;

    println!(
        "\n✓ Done! {} pages, {} articles, {} new AMVs.",
        summary.pages_fetched, summary.entries_seen, summary.new_count
    );
    Ok(())
}

/// Handles `download`: acquires one AMV or every pending one
async fn handle_download(
    config: &Config,
    store: &mut SqliteStorage,
    id: Option<String>,
) -> anyhow::Result<()> {
    let acquirer = Acquirer::new(config)?;

    match id {
        Some(id) => {
            println!("Downloading torrent for AMV {}...", id);
            if !acquirer.acquire(store, &id).await? {
                bail!("Failed to download torrent for AMV {}", id);
            }
            println!("✓ Torrent for AMV {} downloaded", id);
        }
        None => {
            println!("Downloading torrents for all pending AMVs...");
            let summary = acquirer.acquire_all_pending(store).await?;
            println!(
                "\n✓ Done! {} of {} torrents downloaded ({} failed).",
                summary.succeeded, summary.attempted, summary.failed
            );
        }
    }

    Ok(())
}

/// Handles `torrent`: sends selected ready torrents to the client
async fn handle_torrent(
    config: &Config,
    store: &mut SqliteStorage,
    specs: &[String],
) -> anyhow::Result<()> {
    let ids: Vec<String> = if specs.is_empty() {
        store
            .list(Some(AmvState::Ready))?
            .into_iter()
            .map(|record| record.id)
            .collect()
    } else {
        let specs = parse_specs(specs)?;
        select_ids(&*store, &specs, AmvState::Ready)?
    };

    if ids.is_empty() {
        println!("No ready torrents selected.");
        return Ok(());
    }

    let client = CommandTorrentClient::from_config(&config.client);
    println!(
        "Sending {} torrents to {}...",
        ids.len(),
        config.client.torrent_client
    );

    let summary = dispatch(
        store,
        &client,
        &config.storage.torrent_dir,
        &ids,
        config.client.batch_size,
    )
    .await?;

    println!(
        "\n✓ Done! {} sent, {} skipped.",
        summary.dispatched, summary.skipped
    );
    Ok(())
}

/// Handles `checklib`: marks AMVs present in the library as collected
fn handle_checklib(
    config: &Config,
    store: &mut SqliteStorage,
    path: PathBuf,
) -> anyhow::Result<()> {
    if !path.is_dir() {
        bail!("'{}' is not a valid directory", path.display());
    }

    println!("Scanning library at: {}", path.display());

    let scanner = DirectoryScanner::new(path, config.library.id_width)?;
    let report = check_library(store, &scanner)?;

    if report.found == 0 {
        println!(
            "No AMV files found in library (no files starting with a {}-digit id)",
            config.library.id_width
        );
        return Ok(());
    }

    println!(
        "\n✓ {} found, {} marked as collected, {} not in database.",
        report.found, report.marked, report.skipped
    );
    Ok(())
}

/// Handles `list`: prints records, optionally of one state
fn handle_list(store: &SqliteStorage, state: Option<AmvState>) -> anyhow::Result<()> {
    let records = store.list(state)?;
    print_records(&records);
    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config, store: &SqliteStorage) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path.display());

    let stats = load_statistics(store)?;
    print_statistics(&stats);

    Ok(())
}
