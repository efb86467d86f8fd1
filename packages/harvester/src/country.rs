//! Country code to source filename mapping.
//!
//! The table is maintained by hand. Codes or filenames that are not listed
//! are rejected, never guessed from the filename.

use crate::config::validate_country_code;
use crate::error::{HarvesterError, Result};

/// One row of the country table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    /// ISO 3166-1 alpha-2 code.
    pub code: &'static str,

    /// Module filename in the reference library.
    pub filename: &'static str,

    /// English display name.
    pub name: &'static str,
}

const fn entry(code: &'static str, filename: &'static str, name: &'static str) -> CountryEntry {
    CountryEntry {
        code,
        filename,
        name,
    }
}

/// Known countries, sorted by code.
pub const COUNTRIES: &[CountryEntry] = &[
    entry("AR", "argentina.py", "Argentina"),
    entry("AT", "austria.py", "Austria"),
    entry("AU", "australia.py", "Australia"),
    entry("BE", "belgium.py", "Belgium"),
    entry("BR", "brazil.py", "Brazil"),
    entry("CA", "canada.py", "Canada"),
    entry("CH", "switzerland.py", "Switzerland"),
    entry("CL", "chile.py", "Chile"),
    entry("CZ", "czechia.py", "Czechia"),
    entry("DE", "germany.py", "Germany"),
    entry("DK", "denmark.py", "Denmark"),
    entry("ES", "spain.py", "Spain"),
    entry("FI", "finland.py", "Finland"),
    entry("FR", "france.py", "France"),
    entry("GB", "united_kingdom.py", "United Kingdom"),
    entry("GR", "greece.py", "Greece"),
    entry("HU", "hungary.py", "Hungary"),
    entry("IE", "ireland.py", "Ireland"),
    entry("IN", "india.py", "India"),
    entry("IT", "italy.py", "Italy"),
    entry("JP", "japan.py", "Japan"),
    entry("MX", "mexico.py", "Mexico"),
    entry("NL", "netherlands.py", "Netherlands"),
    entry("NO", "norway.py", "Norway"),
    entry("NZ", "new_zealand.py", "New Zealand"),
    entry("PL", "poland.py", "Poland"),
    entry("PT", "portugal.py", "Portugal"),
    entry("SE", "sweden.py", "Sweden"),
    entry("US", "united_states.py", "United States"),
    entry("ZA", "south_africa.py", "South Africa"),
];

/// Look up a table row by country code.
pub fn lookup_code(code: &str) -> Result<&'static CountryEntry> {
    validate_country_code(code)?;
    COUNTRIES
        .iter()
        .find(|c| c.code == code)
        .ok_or_else(|| HarvesterError::UnknownCountry(code.to_string()))
}

/// Source filename for a country code.
///
/// # Examples
/// ```
/// use holiday_harvester::country::filename_for;
///
/// assert_eq!(filename_for("US").unwrap(), "united_states.py");
/// assert!(filename_for("XX").is_err());
/// ```
pub fn filename_for(code: &str) -> Result<&'static str> {
    lookup_code(code).map(|c| c.filename)
}

/// Country code for a source filename.
///
/// Accepts a bare filename or a repository path ending in one.
pub fn code_from_filename(filename: &str) -> Result<&'static str> {
    let basename = filename.rsplit('/').next().unwrap_or(filename);
    COUNTRIES
        .iter()
        .find(|c| c.filename == basename)
        .map(|c| c.code)
        .ok_or_else(|| HarvesterError::UnknownSourceFile(filename.to_string()))
}

/// Display name for a country code.
pub fn country_name(code: &str) -> Result<&'static str> {
    lookup_code(code).map(|c| c.name)
}

/// All codes in the table, in table order.
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    COUNTRIES.iter().map(|c| c.code)
}
