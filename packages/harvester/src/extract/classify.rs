//! Closed, ordered decision list over a call's date argument text.

use std::sync::LazyLock;

use regex::Regex;

use super::call::DateExpression;

/// Three-letter month abbreviations, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

#[allow(clippy::expect_used)]
static FIXED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*date\(\s*(?:self\.)?_?year\s*,\s*([A-Za-z]+|\d{1,2})\s*,\s*(\d{1,2})\s*\)\s*,?\s*$",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static EASTER_BASED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?:easter\([^()]*\)|(?:self\.)?_easter_sunday(?:_date\(\s*\))?)",
        r"\s*(?:([+-])\s*(?:td|timedelta|rd|relativedelta)\(\s*(?:days\s*=\s*)?([+-]?)\s*(\d+)\s*\))?",
        r"\s*,?\s*$",
    ))
    .expect("valid regex")
});

/// Classify the argument text that follows a holiday name.
///
/// Never fails: anything outside the recognized shapes is `Calculated`.
pub fn classify(text: &str) -> DateExpression {
    if let Some(fixed) = classify_fixed(text) {
        return fixed;
    }
    if let Some(offset) = easter_offset(text) {
        return DateExpression::EasterBased { offset };
    }
    DateExpression::Calculated {
        raw: text.trim().to_string(),
    }
}

fn classify_fixed(text: &str) -> Option<DateExpression> {
    let caps = FIXED_DATE.captures(text)?;
    let month_token = caps.get(1)?.as_str();
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;

    // An unknown symbol such as `date(year, MONTH, 1)` is not a fixed date.
    month_number(month_token)?;
    if !(1..=31).contains(&day) {
        return None;
    }

    Some(DateExpression::Fixed {
        month_token: month_token.to_string(),
        day,
    })
}

fn easter_offset(text: &str) -> Option<i32> {
    let caps = EASTER_BASED.captures(text)?;
    let Some(operator) = caps.get(1) else {
        return Some(0);
    };
    let magnitude: i32 = caps.get(3)?.as_str().parse().ok()?;
    let inner_negative = caps.get(2).is_some_and(|m| m.as_str() == "-");
    let outer_negative = operator.as_str() == "-";

    Some(if outer_negative != inner_negative {
        -magnitude
    } else {
        magnitude
    })
}

/// Map a month token to its calendar number.
///
/// Accepts a three-letter abbreviation in any case or a number 1-12.
#[must_use]
pub fn month_number(token: &str) -> Option<u32> {
    let token = token.trim();
    if let Some(index) = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| abbr.eq_ignore_ascii_case(token))
    {
        return u32::try_from(index + 1).ok();
    }
    token
        .parse::<u32>()
        .ok()
        .filter(|month| (1..=12).contains(month))
}
