//! Orchestration: fetch, decode, validate, extract and assemble country data.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::compare::ComparisonEngine;
use crate::config::FetcherConfig;
use crate::country::{code_from_filename, filename_for, lookup_code, CountryEntry, COUNTRIES};
use crate::decode::decode_file;
use crate::error::{HarvesterError, Result};
use crate::fetch::{FileEntry, SourceProvider};
use crate::metadata::extract_metadata;
use crate::types::{CountryData, ParsingComparison, StrategyKind};
use crate::validate::validate_content;

/// Source files in the country directory that never hold a country.
const INDEX_FILES: &[&str] = &["__init__.py"];

/// Extension of candidate source files.
const SOURCE_EXTENSION: &str = ".py";

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestOptions {
    /// Run both strategies and attach the comparison record.
    pub compare: bool,
}

/// Result of parsing one country source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCountry {
    pub data: CountryData,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ParsingComparison>,
}

/// Parse already-decoded source text for a country.
pub fn parse_country_source(
    code: &str,
    text: &str,
    options: HarvestOptions,
) -> Result<ParsedCountry> {
    let entry = lookup_code(code)?;
    validate_content(text)?;

    let engine = ComparisonEngine::default();
    let (holidays, strategy, comparison) = if options.compare {
        let (holidays, comparison) = engine.compare_strategies(text);
        (holidays, comparison.chosen_strategy, Some(comparison))
    } else {
        let (holidays, strategy) = engine.select(text);
        (holidays, strategy, None)
    };

    if holidays.is_empty() {
        tracing::warn!(country = code, "no holiday definitions extracted");
    } else {
        tracing::debug!(
            country = code,
            holidays = holidays.len(),
            strategy = strategy.as_str(),
            "extracted holiday definitions"
        );
    }

    let metadata = extract_metadata(text);
    let data = CountryData {
        country_code: entry.code.to_string(),
        name: entry.name.to_string(),
        subdivisions: metadata
            .subdivisions
            .into_iter()
            .map(|code| (code.clone(), code))
            .collect(),
        categories: metadata.categories,
        languages: metadata.languages,
        holidays,
        fetched_at: Utc::now(),
    };

    Ok(ParsedCountry {
        data,
        strategy,
        comparison,
    })
}

/// Parse a local source file.
///
/// The country code is inferred from the filename when not given.
pub fn parse_source_file(
    path: &Path,
    code: Option<&str>,
    options: HarvestOptions,
) -> Result<ParsedCountry> {
    let code = match code {
        Some(code) => code,
        None => {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| HarvesterError::UnknownSourceFile(path.display().to_string()))?;
            code_from_filename(filename)?
        }
    };
    let text = std::fs::read_to_string(path)?;
    parse_country_source(code, &text, options)
}

/// Known countries among the entries of a directory listing.
///
/// Non-files, non-source files, index files and files missing from the
/// country table are skipped.
pub fn candidate_sources(entries: &[FileEntry]) -> Vec<&'static CountryEntry> {
    let mut found: Vec<&'static CountryEntry> = entries
        .iter()
        .filter(|e| e.is_file())
        .filter(|e| e.name.ends_with(SOURCE_EXTENSION))
        .filter(|e| !INDEX_FILES.contains(&e.name.as_str()))
        .filter_map(|e| {
            let entry = COUNTRIES.iter().find(|c| c.filename == e.name);
            if entry.is_none() {
                tracing::debug!(file = %e.name, "skipping source file missing from country table");
            }
            entry
        })
        .collect();
    found.sort_by_key(|c| c.code);
    found.dedup_by_key(|c| c.code);
    found
}

/// List the countries available in the remote source directory.
pub async fn list_available_countries(
    provider: &dyn SourceProvider,
    config: &FetcherConfig,
    cancel: &CancellationToken,
) -> Result<Vec<&'static CountryEntry>> {
    let entries = provider
        .fetch_directory_listing(&config.source_path, cancel)
        .await?;
    Ok(candidate_sources(&entries))
}

/// Fetch and parse one country.
pub async fn harvest_country(
    provider: &dyn SourceProvider,
    config: &FetcherConfig,
    code: &str,
    cancel: &CancellationToken,
    options: HarvestOptions,
) -> Result<ParsedCountry> {
    let filename = filename_for(code)?;
    let path = config.source_file_path(filename);
    tracing::info!(country = code, path = %path, "harvesting country");

    let file = provider.fetch_file_content(&path, cancel).await?;
    let text = decode_file(&file)?;
    parse_country_source(code, &text, options)
}

/// A country that failed in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub code: String,
    pub error: String,
}

/// Outcome of a batch run. A failed country never stops the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<ParsedCountry>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// `(succeeded, failed)` counts.
    #[must_use]
    pub fn tally(&self) -> (usize, usize) {
        (self.succeeded.len(), self.failed.len())
    }
}

/// Harvest several countries in order.
///
/// After cancellation the remaining countries are reported as cancelled
/// without being requested.
pub async fn harvest_batch(
    provider: &dyn SourceProvider,
    config: &FetcherConfig,
    codes: &[String],
    cancel: &CancellationToken,
    options: HarvestOptions,
) -> BatchReport {
    let mut report = BatchReport::default();

    for code in codes {
        if cancel.is_cancelled() {
            report.failed.push(BatchFailure {
                code: code.clone(),
                error: HarvesterError::Cancelled.to_string(),
            });
            continue;
        }

        match harvest_country(provider, config, code, cancel, options).await {
            Ok(parsed) => report.succeeded.push(parsed),
            Err(e) => {
                tracing::warn!(country = %code, error = %e, "country failed");
                report.failed.push(BatchFailure {
                    code: code.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let (succeeded, failed) = report.tally();
    tracing::info!(succeeded, failed, "batch finished");
    report
}
