//! Holiday Harvester - Mine holiday definitions from country source files.
//!
//! This crate fetches the per-country source files of a reference holidays
//! library from a code host, recognizes their holiday registration calls
//! without executing them, and converts each call into a language-neutral
//! [`HolidayDefinition`].
//!
//! # Example
//!
//! ```
//! use holiday_harvester::compare::compare_strategies;
//! use holiday_harvester::types::{CalculationKind, StrategyKind};
//!
//! let source = r#"
//! class Spain(HolidayBase):
//!     def _populate(self, year):
//!         self._add_holiday("New Year's Day", date(year, JAN, 1))
//!         self._add_easter_based_holiday("Good Friday", -2)
//! "#;
//!
//! let (holidays, comparison) = compare_strategies(source);
//! assert_eq!(comparison.chosen_strategy, StrategyKind::Structural);
//! assert_eq!(holidays["new_year's_day"].calculation_kind, CalculationKind::Fixed);
//! assert_eq!(holidays["good_friday"].easter_offset, Some(-2));
//! ```
//!
//! # Architecture
//!
//! - [`fetch`]: Rate-limited client for the code host's contents API
//! - [`decode`]: Base64 transport decoding
//! - [`validate`]: Cheap content heuristics
//! - [`lexer`]: Tolerant line-oriented tokenizer
//! - [`structure`]: Class and method boundary recovery
//! - [`extract`]: Registration-call shapes and date classification
//! - [`convert`]: Canonical keys and holiday definitions
//! - [`compare`]: Structural vs. line-pattern strategies
//! - [`metadata`]: Subdivisions, categories and languages
//! - [`country`]: Country code to filename table
//! - [`harvester`]: Orchestration and batch runs
//! - [`config`], [`error`], [`types`], [`cli`]

pub mod cli;
pub mod compare;
pub mod config;
pub mod convert;
pub mod country;
pub mod decode;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvester;
pub mod lexer;
pub mod metadata;
pub mod structure;
pub mod types;
pub mod validate;

// Re-export main functions
pub use harvester::{harvest_batch, harvest_country, parse_country_source, parse_source_file};

// Re-export commonly used items
pub use compare::{compare_strategies, ComparisonEngine};
pub use error::{HarvesterError, Result};
pub use fetch::{RateLimiter, SourceFetcher, SourceProvider};
pub use types::{CalculationKind, CountryData, HolidayDefinition, ParsingComparison};
