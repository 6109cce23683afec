//! cdr-harvest main entry point
//!
//! This is the command-line interface for the chemical release registry harvester.

use anyhow::{bail, Context};
use cdr_harvest::client::RegistryClient;
use cdr_harvest::config::{load_config_with_hash, validate_year, Config};
use cdr_harvest::output::{print_summary, JsonFileSink, OutputSink, RunSummary};
use cdr_harvest::{HarvestError, Harvester};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// cdr-harvest: a polite chemical registry harvester
///
/// Finds every facility that reported a substance for a given year,
/// retrieves each facility's detail record and chemical list, and writes
/// the consolidated dataset as JSON.
#[derive(Parser, Debug)]
#[command(name = "cdr-harvest")]
#[command(version)]
#[command(about = "Harvests facility records for a chemical substance", long_about = None)]
struct Cli {
    /// Substance name or CAS number to search for
    #[arg(value_name = "QUERY")]
    query: String,

    /// Reporting year (four digits)
    #[arg(short, long)]
    year: Option<String>,

    /// Maximum number of facilities to retrieve
    #[arg(short = 'n', long)]
    max_companies: Option<usize>,

    /// Pause between facilities, in seconds
    #[arg(short, long, value_name = "SECS")]
    delay: Option<f64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output file (defaults to `{query}_{year}_facilities.json` in the output directory)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show what would be harvested without sending requests
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Effective parameters of one run after applying CLI overrides
#[derive(Debug)]
struct RunPlan {
    query: String,
    year: String,
    max_companies: usize,
    delay: Duration,
    sink: JsonFileSink,
}

impl RunPlan {
    fn resolve(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let query = cli.query.trim().to_string();
        if query.is_empty() {
            bail!("Search query must not be empty");
        }

        let year = cli.year.clone().unwrap_or_else(|| config.harvest.year.clone());
        validate_year(&year)?;

        let max_companies = cli.max_companies.unwrap_or(config.harvest.max_companies);
        if max_companies == 0 {
            bail!("--max-companies must be at least 1");
        }

        let delay = match cli.delay {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Invalid delay: {}", secs))?,
            None => config.harvest.inter_request_delay(),
        };

        let sink = match &cli.output {
            Some(path) => JsonFileSink::at_path(path),
            None => JsonFileSink::in_directory(&config.output.directory),
        };

        Ok(Self {
            query,
            year,
            max_companies,
            delay,
            sink,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let (config, config_hash) = match load_config_with_hash(cli.config.as_deref()) {
        Ok((cfg, hash)) => {
            match &cli.config {
                Some(path) => tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                ),
                None => tracing::info!("Using built-in configuration"),
            }
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let plan = RunPlan::resolve(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &plan);
        return Ok(());
    }

    handle_harvest(config, config_hash, plan).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cdr_harvest=info,warn"),
            1 => EnvFilter::new("cdr_harvest=debug,info"),
            2 => EnvFilter::new("cdr_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective plan without requests
fn handle_dry_run(config: &Config, plan: &RunPlan) {
    println!("=== cdr-harvest Dry Run ===\n");

    println!("Query:");
    println!("  Substance: {}", plan.query);
    println!("  Year: {}", plan.year);
    println!("  Max facilities: {}", plan.max_companies);
    println!("  Delay between facilities: {:.1}s", plan.delay.as_secs_f64());

    println!("\nUpstream:");
    println!("  Base URL: {}", config.upstream.base_url);
    println!("  Listing: {}", config.upstream.listing_path);
    println!("  Detail: {}", config.upstream.detail_path);
    println!("  Chemicals: {}", config.upstream.chemical_path);
    println!("  User agent: {}", config.upstream.user_agent);

    println!("\nRetrieval:");
    println!("  Listing page size: {}", config.listing.page_size);
    println!("  Detail attempts: {}", config.detail.max_attempts);
    println!("  Retry delay: {}ms", config.detail.retry_delay_ms);
    println!("  Chemical page unit: {}", config.chemical.page_unit);

    println!("\nIdentity labels ({}):", config.detail.identity_labels.len());
    for label in &config.detail.identity_labels {
        println!("  - {}", label);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: String, plan: RunPlan) -> anyhow::Result<()> {
    let client = RegistryClient::from_config(&config)?;
    let harvester = Harvester::from_config(client, &config, config_hash)?;

    // Ctrl-C stops the run between facilities; the partial dataset is kept
    let cancel = harvester.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current facility");
            cancel.cancel();
        }
    });

    let result = match harvester
        .run(&plan.query, &plan.year, plan.max_companies, plan.delay)
        .await
    {
        Ok(result) => result,
        Err(e @ HarvestError::Unreachable { .. }) => {
            tracing::error!("{}", e);
            bail!("could not reach upstream registry at {}", config.upstream.base_url);
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    let written = plan
        .sink
        .write_non_empty(&result)
        .context("Failed to write harvest result")?;

    print_summary(&RunSummary::from_result(&result));
    match written {
        Some(path) => println!("\n✓ Dataset written to: {}", path.display()),
        None => println!("\nNo data collected for '{}'; no file written.", plan.query),
    }

    Ok(())
}
