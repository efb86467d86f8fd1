//! Cheap content heuristics run before tokenizing a decoded source file.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{HarvesterError, Result};
use crate::extract::contains_registration_call;

#[allow(clippy::expect_used)]
static CLASS_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*class[ \t]+[A-Za-z_]\w*").expect("valid regex"));

/// Reject text that cannot hold a country holiday class.
///
/// Requires at least one class declaration and at least one recognized
/// registration call.
pub fn validate_content(text: &str) -> Result<()> {
    if !CLASS_DECLARATION.is_match(text) {
        return Err(HarvesterError::validation("no class declaration found"));
    }
    if !contains_registration_call(text) {
        return Err(HarvesterError::validation(
            "no recognized holiday registration call found",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_source() {
        let text = "class Spain(HolidayBase):\n    def _populate(self, year):\n        self._add_holiday(\"New Year's Day\", date(year, JAN, 1))\n";
        assert!(validate_content(text).is_ok());
    }

    #[test]
    fn test_missing_class() {
        let err = validate_content("self._add_holiday(\"X\", date(year, JAN, 1))\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content validation failed: no class declaration found"
        );
    }

    #[test]
    fn test_missing_calls() {
        let err = validate_content("class Empty:\n    pass\n").unwrap_err();
        assert!(matches!(err, HarvesterError::Validation { .. }));
        assert!(err.to_string().contains("registration call"));
    }

    #[test]
    fn test_class_word_in_text_is_not_a_declaration() {
        let text = "# first class holidays\nx = \"class\"\nself._add_holiday(\"X\", date(year, JAN, 1))\n";
        assert!(validate_content(text).is_err());
    }
}
