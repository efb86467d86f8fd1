//! Core data types for the harvester.
//!
//! `HolidayDefinition` and `CountryData` are the output contract: the
//! persistence layer serializes them as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default holiday category when the source does not say otherwise.
pub const DEFAULT_CATEGORY: &str = "public";

/// Language key under which the source name is always stored.
pub const SOURCE_LANGUAGE: &str = "en";

/// How a holiday's date is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Same month and day every year.
    Fixed,

    /// Offset in days from Easter Sunday.
    EasterBased,

    /// Nth weekday of a month (rule kept as text).
    WeekdayBased,

    /// Anything the classifier could not reduce to the above.
    Complex,
}

impl CalculationKind {
    /// Get the string value used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::EasterBased => "easter_based",
            Self::WeekdayBased => "weekday_based",
            Self::Complex => "complex",
        }
    }
}

/// Canonical, language-neutral definition of one holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayDefinition {
    /// Holiday name as written in the source.
    pub name: String,

    /// Holiday category (e.g., "public").
    pub category: String,

    /// Localized names keyed by language code.
    pub language_names: BTreeMap<String, String>,

    /// Calculation strategy.
    pub calculation_kind: CalculationKind,

    /// Month (1-12) for fixed holidays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    /// Day of month for fixed holidays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,

    /// Signed day offset from Easter Sunday.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easter_offset: Option<i32>,

    /// Raw weekday rule text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday_rule: Option<String>,

    /// Raw date expression of complex holidays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl HolidayDefinition {
    /// Create a definition with the default category and the source name
    /// registered as the English name. Date fields start empty.
    #[must_use]
    pub fn new(name: impl Into<String>, calculation_kind: CalculationKind) -> Self {
        let name = name.into();
        let mut language_names = BTreeMap::new();
        language_names.insert(SOURCE_LANGUAGE.to_string(), name.clone());
        Self {
            name,
            category: DEFAULT_CATEGORY.to_string(),
            language_names,
            calculation_kind,
            month: None,
            day: None,
            easter_offset: None,
            weekday_rule: None,
            expression: None,
        }
    }

    /// Check the per-kind field invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self.calculation_kind {
            CalculationKind::Fixed => {
                matches!(self.month, Some(1..=12)) && matches!(self.day, Some(1..=31))
            }
            CalculationKind::EasterBased => self.easter_offset.is_some(),
            CalculationKind::WeekdayBased | CalculationKind::Complex => true,
        }
    }
}

/// Everything harvested for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryData {
    /// ISO 3166-1 alpha-2 code.
    pub country_code: String,

    /// Display name from the country table.
    pub name: String,

    /// Subdivision code to name.
    pub subdivisions: BTreeMap<String, String>,

    /// Supported holiday categories.
    pub categories: Vec<String>,

    /// Supported languages.
    pub languages: Vec<String>,

    /// Holidays keyed by canonical key.
    pub holidays: BTreeMap<String, HolidayDefinition>,

    /// When the source was fetched (or parsed, for local files).
    pub fetched_at: DateTime<Utc>,
}

/// Which extraction strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Tokenizer and structural parser, class-scoped extraction.
    Structural,

    /// Raw line scan over the whole file.
    LinePattern,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::LinePattern => "line_pattern",
        }
    }
}

/// Diagnostic record of a structural vs. line-pattern run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingComparison {
    pub structural_count: usize,
    pub line_pattern_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_error: Option<String>,
    pub chosen_strategy: StrategyKind,
    /// Keys produced by exactly one of the two strategies, sorted.
    pub differing_keys: Vec<String>,
}

impl ParsingComparison {
    /// Whether both strategies agreed on the key set.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.differing_keys.is_empty()
    }
}
