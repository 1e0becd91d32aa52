//! Fault-Harvest main entry point
//!
//! This is the command-line interface for harvesting and looking up fault codes.

use anyhow::{bail, Context};
use clap::Parser;
use fault_harvest::config::{load_config_or_default, Config};
use fault_harvest::crawler::run_crawl;
use fault_harvest::lookup::{search, QueryGrammar};
use fault_harvest::output::{
    export_snapshot, load_statistics, print_statistics, render_outcome, restore_snapshot,
};
use fault_harvest::storage::{FaultCodeStore, SqliteStore};
use fault_harvest::{CrawlSummary, HarvestError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Fault-Harvest: a polite fault-code reference harvester
///
/// Fault-Harvest walks a paginated wiki category of diagnostic fault codes,
/// extracts every detail page into a structured record, and keeps them in a
/// local SQLite database that can be searched offline.
#[derive(Parser, Debug)]
#[command(name = "fault-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite fault-code reference harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Process only the first few discovered fault codes
    #[arg(long)]
    test_mode: bool,

    /// Do not ask for confirmation before crawling
    #[arg(short, long)]
    yes: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["search", "export_snapshot", "restore_snapshot"])]
    stats: bool,

    /// Look up a fault code in the database and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["export_snapshot", "restore_snapshot"])]
    search: Option<String>,

    /// Query grammar used by --search (numeric or alphanumeric)
    #[arg(long, default_value = "numeric")]
    grammar: QueryGrammar,

    /// Write a compressed snapshot of the database and its metadata, then exit
    #[arg(long, conflicts_with = "restore_snapshot")]
    export_snapshot: bool,

    /// Replace the database with the contents of a compressed snapshot, then exit
    #[arg(long, value_name = "FILE")]
    restore_snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Default configuration is invalid".to_string(),
    })?;
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    // Handle different modes
    if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = &cli.search {
        handle_search(&config, query, cli.grammar)?;
    } else if cli.export_snapshot {
        handle_export_snapshot(&config)?;
    } else if let Some(snapshot) = &cli.restore_snapshot {
        handle_restore_snapshot(&config, snapshot)?;
    } else {
        handle_crawl(&config, cli.test_mode, cli.yes).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fault_harvest=info,warn"),
            1 => EnvFilter::new("fault_harvest=debug,info"),
            2 => EnvFilter::new("fault_harvest=trace,debug"),
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

/// Opens the database for reading, refusing to create a missing one
fn open_existing(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = Path::new(&config.output.database_path);
    if !path.exists() {
        bail!(
            "Database not found at {}. Run the harvester first.",
            path.display()
        );
    }
    SqliteStore::new(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_existing(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: renders the lookup result
///
/// Invalid input and store failures are reported as messages, not errors.
fn handle_search(config: &Config, query: &str, grammar: QueryGrammar) -> anyhow::Result<()> {
    let store = open_existing(config)?;

    match search(&store, query, grammar) {
        Ok(outcome) => print!("{}", render_outcome(&outcome, query.trim())),
        Err(HarvestError::Validation(e)) => println!("{}", e),
        Err(e) => println!("Database error: {}", e),
    }

    Ok(())
}

/// Handles the --export-snapshot mode: compresses the database for transfer
fn handle_export_snapshot(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Database Snapshot ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Snapshot: {}", config.output.snapshot_path);
    println!("Metadata: {}", config.output.metadata_path);
    println!();

    let metadata = export_snapshot(
        Path::new(&config.output.database_path),
        Path::new(&config.output.snapshot_path),
        Path::new(&config.output.metadata_path),
    )?;

    println!("Total codes: {}", metadata.total_codes);
    println!("PDF codes: {}", metadata.pdf_codes);
    println!("Ross-Tech codes: {}", metadata.ross_tech_codes);
    println!(
        "Size: {} -> {} bytes",
        metadata.original_size, metadata.compressed_size
    );
    println!("\n✓ Snapshot {} exported to: {}", metadata.version, config.output.snapshot_path);

    Ok(())
}

/// Handles the --restore-snapshot mode: unpacks a snapshot over the database
fn handle_restore_snapshot(config: &Config, snapshot: &Path) -> anyhow::Result<()> {
    println!("=== Restoring Database Snapshot ===\n");
    println!("Snapshot: {}", snapshot.display());
    println!("Database: {}", config.output.database_path);
    println!();

    let total = restore_snapshot(snapshot, Path::new(&config.output.database_path))?;
    println!("✓ Restored {} fault codes", total);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, test_mode: bool, assume_yes: bool) -> anyhow::Result<()> {
    let existing = SqliteStore::new(Path::new(&config.output.database_path))?.count()?;

    let mut test_mode = test_mode;
    if !assume_yes {
        if existing > 0
            && !confirm(&format!(
                "Database already contains {} fault codes. Continue anyway?",
                existing
            ))?
        {
            println!("Crawling cancelled.");
            return Ok(());
        }

        if !test_mode {
            test_mode = confirm(&format!(
                "Run in test mode (crawl only first {} fault codes)?",
                config.crawler.test_mode_limit
            ))?;
        }
    }

    if test_mode {
        tracing::info!(
            "Running in test mode - will crawl only first {} fault codes",
            config.crawler.test_mode_limit
        );
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page...");
            interrupt.cancel();
        }
    });

    match run_crawl(config, test_mode, cancel).await {
        Ok(summary) => {
            print_summary(&summary, &config.output.database_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &CrawlSummary, database_path: &str) {
    println!("\n=== Harvest Summary ===\n");
    println!("  Listing pages visited: {}", summary.pages_visited);
    println!("  Links found: {}", summary.links_found);
    println!("  Pages processed: {}", summary.processed);
    println!("  Saved: {}", summary.succeeded);
    println!("  Errors: {}", summary.failed);
    if summary.store_errors > 0 {
        println!("  Database errors: {}", summary.store_errors);
    }
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());

    if summary.page_cap_reached {
        println!("\n! Page limit reached; later listing pages were not visited");
    }
    if summary.cancelled {
        println!("\n! Harvest interrupted; records saved so far are kept");
    }
    println!("\nDatabase saved as: {}", database_path);
}

/// Asks a yes/no question on the terminal; anything but "y" is no
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} (y/n): ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
