//! Topic-Harvester main entry point
//!
//! This is the command-line interface for the keyword-scoped page harvester.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use topic_harvester::config::{load_config_with_hash, Config};
use topic_harvester::crawler::{stop_channel, Harvester, RecrawlScheduler, StopHandle, StopSignal};
use topic_harvester::seeds::{read_url_list, write_url_list, SeedLoader};
use tracing_subscriber::EnvFilter;

/// Topic-Harvester: a keyword-scoped page harvester
///
/// Topic-Harvester discovers pages under a target domain from a sitemap or
/// URL list, follows only links whose URL mentions a configured keyword,
/// and stores the cleaned page text. It can re-harvest a fixed URL list on
/// a schedule.
#[derive(Parser, Debug)]
#[command(name = "topic-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A keyword-scoped page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

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
    /// Discover seeds and run one depth-bounded harvest
    Once,

    /// Re-harvest the configured URL list on the recrawl interval until stopped
    Schedule,

    /// Export the filtered seed URLs to a line-delimited file
    Seeds {
        /// Output file (defaults to the schedule url-file, or stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Show statistics from the database and exit
    Stats,

    /// Validate config and show what would be harvested
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Once => handle_once(&config, &config_hash).await,
        Command::Schedule => handle_schedule(&config, &config_hash).await,
        Command::Seeds { out } => handle_seeds(&config, out).await,
        Command::Stats => handle_stats(&config),
        Command::Check => handle_check(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("topic_harvester=info,warn"),
            1 => EnvFilter::new("topic_harvester=debug,info"),
            2 => EnvFilter::new("topic_harvester=trace,debug"),
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

/// Stop signal that fires on Ctrl-C
fn install_ctrl_c() -> StopSignal {
    let (handle, signal) = stop_channel();
    tokio::spawn(watch_ctrl_c(handle));
    signal
}

async fn watch_ctrl_c(handle: StopHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Interrupt received, stopping after the current batch");
        handle.stop();
    }
}

/// Handles `check`: validates config and shows what would be harvested
fn handle_check(config: &Config) -> anyhow::Result<()> {
    println!("=== Topic-Harvester Check ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Fetch timeout: {:?}", config.crawler.fetch_timeout());
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Settle delay: {:?}", config.crawler.settle_delay());

    println!("\nFilter:");
    println!("  Keywords: {}", config.filter.keywords.join(", "));
    println!(
        "  Required domain substring: {}",
        config.filter.required_domain_substring
    );

    println!("\nSeeds:");
    match config.seeds.source() {
        Some(source) => println!("  Source: {}", source),
        None => println!("  Source: (none)"),
    }
    if let Some(filter) = &config.seeds.path_filter {
        println!("  Path filter: {}", filter);
    }
    println!("  Force HTTPS: {}", config.seeds.force_https);

    println!("\nSchedule:");
    println!("  Recrawl interval: {:?}", config.schedule.recrawl_interval());
    match config.schedule.run_limit() {
        Some(limit) => println!("  Max runs: {}", limit),
        None => println!("  Max runs: unlimited"),
    }
    if let Some(path) = &config.schedule.url_file {
        println!("  URL file: {}", path);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(dir) = &config.output.text_directory {
        println!("  Text directory: {}", dir);
    }
    if let Some(path) = &config.output.json_path {
        println!("  JSON file: {}", path);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use topic_harvester::output::{load_statistics, print_statistics};
    use topic_harvester::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles `seeds`: exports the filtered seed list
async fn handle_seeds(config: &Config, out: Option<PathBuf>) -> anyhow::Result<()> {
    let source = config
        .seeds
        .source()
        .ok_or_else(|| anyhow!("No seed source configured"))?;

    let loader = SeedLoader::from_config(config)?;
    let seeds = loader.load(&source, &config.seeds.options()).await?;

    let target = out.or_else(|| config.schedule.url_file.as_ref().map(PathBuf::from));
    match target {
        Some(path) => {
            write_url_list(&path, &seeds)?;
            println!("✓ Wrote {} seed URLs to {}", seeds.len(), path.display());
        }
        None => {
            for url in &seeds {
                println!("{}", url);
            }
        }
    }

    Ok(())
}

/// Handles `once`: one depth-bounded harvest from the configured seeds
async fn handle_once(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let source = config
        .seeds
        .source()
        .ok_or_else(|| anyhow!("No seed source configured"))?;

    let stop = install_ctrl_c();
    let harvester = Harvester::from_config(config, config_hash, stop)?;

    match harvester.run_once(&source, &config.seeds.options()).await {
        Ok(result) => {
            println!(
                "✓ Harvest complete: {} saved, {} failed, peak memory {} bytes",
                result.success_count, result.failure_count, result.peak_memory_bytes
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `schedule`: periodic re-harvest of a fixed URL list
async fn handle_schedule(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let stop = install_ctrl_c();
    let harvester = Harvester::from_config(config, config_hash, stop.clone())?;

    let urls = match &config.schedule.url_file {
        Some(path) => read_url_list(Path::new(path))?,
        None => {
            let source = config
                .seeds
                .source()
                .ok_or_else(|| anyhow!("No URL file or seed source configured"))?;
            harvester
                .discover_seeds(&source, &config.seeds.options())
                .await?
        }
    };

    tracing::info!(
        "Scheduling {} URLs every {:?}",
        urls.len(),
        config.schedule.recrawl_interval()
    );

    let mut scheduler = RecrawlScheduler::new(harvester, urls, config.schedule.recrawl_interval())
        .with_max_runs(config.schedule.run_limit());
    let report = scheduler.run(stop).await;

    println!(
        "✓ Scheduler stopped after {} runs ({} failed)",
        report.runs, report.failed_runs
    );
    for run in &report.history {
        match &run.outcome {
            Ok(result) => println!(
                "  {}: {} saved, {} failed",
                run.batch_id, result.success_count, result.failure_count
            ),
            Err(message) => println!("  {}: error: {}", run.batch_id, message),
        }
    }

    Ok(())
}
