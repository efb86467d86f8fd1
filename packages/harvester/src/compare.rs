//! Dual-strategy extraction with an explicit comparison record.
//!
//! The structural strategy scopes extraction to recovered class bodies;
//! the line-pattern strategy scans every line. The structural result is
//! preferred when it succeeds with at least one definition.

use std::collections::{BTreeMap, BTreeSet};

use crate::convert::convert;
use crate::error::StructureError;
use crate::extract::{extract_calls, extract_calls_in, HolidayCall};
use crate::lexer::tokenize;
use crate::structure::parse_classes;
use crate::types::{HolidayDefinition, ParsingComparison, StrategyKind};

/// One way of turning source text into holiday calls.
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn extract(&self, text: &str) -> Result<Vec<HolidayCall>, StructureError>;
}

/// Tokenize, recover classes, extract within class line ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStrategy;

impl ExtractionStrategy for StructuralStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structural
    }

    fn extract(&self, text: &str) -> Result<Vec<HolidayCall>, StructureError> {
        let stream = tokenize(text);
        if stream.skipped_chars > 0 {
            tracing::debug!(skipped_chars = stream.skipped_chars, "lexer skipped characters");
        }

        let report = parse_classes(&stream.tokens);
        for warning in &report.warnings {
            tracing::debug!(%warning, "structural parse warning");
        }
        if report.classes.is_empty() {
            return Err(StructureError::NoClasses);
        }

        Ok(extract_calls_in(text, &report.class_ranges()))
    }
}

/// Scan every line with the call-shape table.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePatternStrategy;

impl ExtractionStrategy for LinePatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LinePattern
    }

    fn extract(&self, text: &str) -> Result<Vec<HolidayCall>, StructureError> {
        Ok(extract_calls(text))
    }
}

/// Runs a primary strategy with a fallback.
pub struct ComparisonEngine {
    primary: Box<dyn ExtractionStrategy>,
    fallback: Box<dyn ExtractionStrategy>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(Box::new(StructuralStrategy), Box::new(LinePatternStrategy))
    }
}

impl ComparisonEngine {
    pub fn new(
        primary: Box<dyn ExtractionStrategy>,
        fallback: Box<dyn ExtractionStrategy>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Definitions from the preferred strategy, running the fallback only
    /// when needed.
    pub fn select(&self, text: &str) -> (BTreeMap<String, HolidayDefinition>, StrategyKind) {
        match self.primary.extract(text) {
            Ok(calls) if !calls.is_empty() => (convert(&calls), self.primary.kind()),
            Ok(_) => {
                tracing::debug!(strategy = self.primary.kind().as_str(), "no calls, falling back");
                self.run_fallback(text)
            }
            Err(e) => {
                tracing::debug!(
                    strategy = self.primary.kind().as_str(),
                    error = %e,
                    "strategy failed, falling back"
                );
                self.run_fallback(text)
            }
        }
    }

    fn run_fallback(&self, text: &str) -> (BTreeMap<String, HolidayDefinition>, StrategyKind) {
        let calls = self.fallback.extract(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "fallback strategy failed");
            Vec::new()
        });
        (convert(&calls), self.fallback.kind())
    }

    /// Run both strategies and report how they differ.
    pub fn compare_strategies(
        &self,
        text: &str,
    ) -> (BTreeMap<String, HolidayDefinition>, ParsingComparison) {
        let (primary, primary_error) = match self.primary.extract(text) {
            Ok(calls) => (convert(&calls), None),
            Err(e) => (BTreeMap::new(), Some(e.to_string())),
        };
        let fallback = match self.fallback.extract(text) {
            Ok(calls) => convert(&calls),
            Err(e) => {
                tracing::warn!(error = %e, "fallback strategy failed");
                BTreeMap::new()
            }
        };

        let primary_keys: BTreeSet<&String> = primary.keys().collect();
        let fallback_keys: BTreeSet<&String> = fallback.keys().collect();
        let differing_keys: Vec<String> = primary_keys
            .symmetric_difference(&fallback_keys)
            .map(|k| (*k).clone())
            .collect();

        let use_primary = primary_error.is_none() && !primary.is_empty();
        let comparison = ParsingComparison {
            structural_count: primary.len(),
            line_pattern_count: fallback.len(),
            structural_error: primary_error,
            chosen_strategy: if use_primary {
                self.primary.kind()
            } else {
                self.fallback.kind()
            },
            differing_keys,
        };

        if !comparison.is_consistent() {
            tracing::warn!(
                structural = comparison.structural_count,
                line_pattern = comparison.line_pattern_count,
                differing = ?comparison.differing_keys,
                "extraction strategies disagree"
            );
        }

        let chosen = if use_primary { primary } else { fallback };
        (chosen, comparison)
    }
}

/// Compare the default structural and line-pattern strategies.
pub fn compare_strategies(text: &str) -> (BTreeMap<String, HolidayDefinition>, ParsingComparison) {
    ComparisonEngine::default().compare_strategies(text)
}
