//! Canonicalization of extracted calls into keyed holiday definitions.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{month_number, DateExpression, HolidayCall};
use crate::types::{CalculationKind, HolidayDefinition};

/// Key used when a name has no characters left after normalization.
const FALLBACK_KEY: &str = "holiday";

#[allow(clippy::expect_used)]
static KEY_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s'-]").expect("valid regex"));

#[allow(clippy::expect_used)]
static KEY_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Derive the canonical lookup key for a holiday name.
///
/// `"New Year's Day"` becomes `"new_year's_day"`.
#[must_use]
pub fn holiday_key(name: &str) -> String {
    let name = name.replace('\u{2019}', "'");
    let stripped = KEY_STRIP.replace_all(&name, "");
    let joined = KEY_SEPARATORS.replace_all(&stripped, "_");
    let key = joined.to_lowercase().trim_matches('_').to_string();
    if key.is_empty() {
        FALLBACK_KEY.to_string()
    } else {
        key
    }
}

/// Calendar number of a month token, January when unrecognized.
#[must_use]
pub fn normalize_month(token: &str) -> u32 {
    month_number(token).unwrap_or_else(|| {
        tracing::warn!(token, "unrecognized month token, defaulting to January");
        1
    })
}

/// Build the definition for a single call.
#[must_use]
pub fn to_definition(call: &HolidayCall) -> HolidayDefinition {
    match &call.date {
        DateExpression::Fixed { month_token, day } => {
            let mut def = HolidayDefinition::new(&call.name, CalculationKind::Fixed);
            def.month = Some(normalize_month(month_token));
            def.day = Some(*day);
            def
        }
        DateExpression::EasterBased { offset } => {
            let mut def = HolidayDefinition::new(&call.name, CalculationKind::EasterBased);
            def.easter_offset = Some(*offset);
            def
        }
        DateExpression::WeekdayBased { rule } => {
            let mut def = HolidayDefinition::new(&call.name, CalculationKind::WeekdayBased);
            def.weekday_rule = Some(rule.clone());
            def
        }
        DateExpression::Calculated { raw } => {
            let mut def = HolidayDefinition::new(&call.name, CalculationKind::Complex);
            def.expression = Some(raw.clone());
            def
        }
    }
}

/// Result of converting a list of calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub definitions: BTreeMap<String, HolidayDefinition>,

    /// Keys assigned to calls whose base key was already taken.
    pub collisions: Vec<String>,
}

/// Convert calls, disambiguating colliding keys with `_2`, `_3`, ...
///
/// The first call with a given key keeps the plain key.
pub fn convert_with_report(calls: &[HolidayCall]) -> Conversion {
    let mut conversion = Conversion::default();

    for call in calls {
        let base = holiday_key(&call.name);
        let key = if conversion.definitions.contains_key(&base) {
            let key = (2..)
                .map(|n| format!("{base}_{n}"))
                .find(|candidate| !conversion.definitions.contains_key(candidate))
                .unwrap_or_else(|| base.clone());
            tracing::warn!(
                key = %base,
                assigned = %key,
                line = call.line_number,
                "duplicate holiday key"
            );
            conversion.collisions.push(key.clone());
            key
        } else {
            base
        };
        conversion.definitions.insert(key, to_definition(call));
    }

    conversion
}

/// Convert calls into definitions keyed by canonical key.
pub fn convert(calls: &[HolidayCall]) -> BTreeMap<String, HolidayDefinition> {
    convert_with_report(calls).definitions
}
