//! Command-line interface for the harvester.
//!
//! JSON goes to stdout; progress and summaries go to stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{validate_country_code, FetcherConfig};
use crate::error::Result;
use crate::fetch::SourceFetcher;
use crate::harvester::{
    harvest_batch, harvest_country, list_available_countries, parse_source_file, HarvestOptions,
    ParsedCountry,
};

/// Holiday Harvester - Mine holiday definitions from country source files.
#[derive(Parser)]
#[command(name = "holiday-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum milliseconds between API requests (overrides HOLIDAY_REQUEST_INTERVAL_MS)
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List countries available in the remote source directory.
    List,

    /// Fetch and parse one country by code.
    Fetch {
        /// ISO 3166-1 alpha-2 country code (e.g., ES)
        code: String,

        /// Run both extraction strategies and include the comparison
        #[arg(long)]
        compare: bool,
    },

    /// Parse a local source file.
    Parse {
        /// Path to the source file
        file: PathBuf,

        /// Country code (default: inferred from the filename)
        #[arg(short, long)]
        country: Option<String>,

        /// Run both extraction strategies and include the comparison
        #[arg(long)]
        compare: bool,
    },

    /// Compare the structural and line-pattern strategies on a local file.
    Compare {
        /// Path to the source file
        file: PathBuf,

        /// Country code (default: inferred from the filename)
        #[arg(short, long)]
        country: Option<String>,
    },

    /// Fetch and parse several countries, continuing past failures.
    Batch {
        /// Country codes
        #[arg(required = true)]
        codes: Vec<String>,

        /// Run both extraction strategies and include the comparison
        #[arg(long)]
        compare: bool,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    match cli.command {
        Commands::List => list_command(cli.interval_ms, &cancel).await,
        Commands::Fetch { code, compare } => {
            fetch_command(&code, cli.interval_ms, &cancel, HarvestOptions { compare }).await
        }
        Commands::Parse {
            file,
            country,
            compare,
        } => parse_command(&file, country.as_deref(), HarvestOptions { compare }),
        Commands::Compare { file, country } => compare_command(&file, country.as_deref()),
        Commands::Batch { codes, compare } => {
            batch_command(&codes, cli.interval_ms, &cancel, HarvestOptions { compare }).await
        }
    }
}

fn load_config(interval_ms: Option<u64>) -> Result<FetcherConfig> {
    let mut config = FetcherConfig::from_env()?;
    if let Some(ms) = interval_ms {
        config.request_interval = Duration::from_millis(ms);
    }
    Ok(config)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(parsed: &ParsedCountry) {
    eprintln!(
        "{} {} ({})",
        style("Parsed").bold(),
        style(&parsed.data.name).cyan(),
        parsed.data.country_code
    );
    eprintln!("  Holidays: {}", style(parsed.data.holidays.len()).green());
    eprintln!("  Strategy: {}", parsed.strategy.as_str());
    if let Some(comparison) = &parsed.comparison {
        if !comparison.is_consistent() {
            eprintln!(
                "  Differing keys: {}",
                style(comparison.differing_keys.len()).yellow().bold()
            );
        }
    }
}

async fn list_command(interval_ms: Option<u64>, cancel: &CancellationToken) -> Result<()> {
    let config = load_config(interval_ms)?;
    let fetcher = SourceFetcher::new(config.clone())?;

    let pb = spinner("Fetching directory listing...");
    let result = list_available_countries(&fetcher, &config, cancel).await;
    pb.finish_and_clear();

    let countries = result?;
    for country in &countries {
        println!("{}\t{}\t{}", country.code, country.filename, country.name);
    }
    eprintln!(
        "{} {}",
        style("Available countries:").green().bold(),
        countries.len()
    );
    Ok(())
}

async fn fetch_command(
    code: &str,
    interval_ms: Option<u64>,
    cancel: &CancellationToken,
    options: HarvestOptions,
) -> Result<()> {
    validate_country_code(code)?;
    let config = load_config(interval_ms)?;
    let fetcher = SourceFetcher::new(config.clone())?;

    let pb = spinner(&format!("Fetching {code}..."));
    let result = harvest_country(&fetcher, &config, code, cancel, options).await;
    pb.finish_and_clear();

    let parsed = result?;
    print_summary(&parsed);
    print_json(&parsed)
}

fn parse_command(file: &Path, country: Option<&str>, options: HarvestOptions) -> Result<()> {
    let parsed = parse_source_file(file, country, options)?;
    print_summary(&parsed);
    print_json(&parsed)
}

fn compare_command(file: &Path, country: Option<&str>) -> Result<()> {
    let parsed = parse_source_file(file, country, HarvestOptions { compare: true })?;
    let Some(comparison) = parsed.comparison else {
        return Ok(());
    };

    eprintln!(
        "{} structural {} / line-pattern {}, chose {}",
        style("Compared").bold(),
        comparison.structural_count,
        comparison.line_pattern_count,
        style(comparison.chosen_strategy.as_str()).cyan()
    );
    print_json(&comparison)
}

async fn batch_command(
    codes: &[String],
    interval_ms: Option<u64>,
    cancel: &CancellationToken,
    options: HarvestOptions,
) -> Result<()> {
    for code in codes {
        validate_country_code(code)?;
    }
    let config = load_config(interval_ms)?;
    let fetcher = SourceFetcher::new(config.clone())?;

    let pb = spinner(&format!("Harvesting {} countries...", codes.len()));
    let report = harvest_batch(&fetcher, &config, codes, cancel, options).await;
    pb.finish_and_clear();

    let (succeeded, failed) = report.tally();
    eprintln!(
        "{} {} succeeded, {} failed",
        style("Batch finished:").bold(),
        style(succeeded).green(),
        if failed > 0 {
            style(failed).red().bold()
        } else {
            style(failed)
        }
    );
    for failure in &report.failed {
        eprintln!("  {} {}", style(&failure.code).yellow(), failure.error);
    }
    print_json(&report)
}
