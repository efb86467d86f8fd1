//! Ordered table of rule-registration call shapes.
//!
//! Each recognizer is a pure function of one (possibly joined) statement.
//! The first shape whose pattern matches a line owns it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::call::{DateExpression, HolidayCall, RegistrationMethod};
use super::classify::{classify, month_number};
use crate::error::ExtractError;
use crate::lexer::unescape;

#[allow(clippy::expect_used)]
static WEEKDAY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bself\._add_(?:weekday_based|nth_weekday)_holiday\s*\(").expect("valid regex")
});

#[allow(clippy::expect_used)]
static WEEKDAY_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bself\._add_holiday_((?:\d(?:st|nd|rd|th)|last)_[a-z]{3}_(?:of|before|from)_[a-z]{3}(?:_\d{1,2})?)\s*\(",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static EASTER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bself\._add_easter_based_holiday\s*\(").expect("valid regex")
});

#[allow(clippy::expect_used)]
static GENERIC_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bself\._add_holiday(?:_([a-z]{3})_(\d{1,2}))?\s*\(").expect("valid regex")
});

#[allow(clippy::expect_used)]
static HELPER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<String> = HELPERS.iter().map(|(name, _)| regex::escape(name)).collect();
    Regex::new(&format!(r"\bself\.({})\s*\(", names.join("|"))).expect("valid regex")
});

#[allow(clippy::expect_used)]
static SIGNED_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-])?\s*\b(\d+)\b").expect("valid regex"));

#[allow(clippy::expect_used)]
static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("valid regex"));

#[allow(clippy::expect_used)]
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:[^'\\]|\\.)*)'").expect("valid regex"));

/// Date rule implied by a named helper method.
#[derive(Debug, Clone, Copy)]
enum HelperDate {
    Fixed(&'static str, u32),
    Easter(i32),
}

/// Named registration helpers whose date is implied by the method itself.
const HELPERS: &[(&str, HelperDate)] = &[
    ("_add_new_years_day", HelperDate::Fixed("JAN", 1)),
    ("_add_epiphany_day", HelperDate::Fixed("JAN", 6)),
    ("_add_labor_day", HelperDate::Fixed("MAY", 1)),
    ("_add_assumption_of_mary_day", HelperDate::Fixed("AUG", 15)),
    ("_add_all_saints_day", HelperDate::Fixed("NOV", 1)),
    ("_add_immaculate_conception_day", HelperDate::Fixed("DEC", 8)),
    ("_add_christmas_eve", HelperDate::Fixed("DEC", 24)),
    ("_add_christmas_day", HelperDate::Fixed("DEC", 25)),
    ("_add_christmas_day_two", HelperDate::Fixed("DEC", 26)),
    ("_add_new_years_eve", HelperDate::Fixed("DEC", 31)),
    ("_add_carnival_monday", HelperDate::Easter(-48)),
    ("_add_carnival_tuesday", HelperDate::Easter(-47)),
    ("_add_ash_wednesday", HelperDate::Easter(-46)),
    ("_add_palm_sunday", HelperDate::Easter(-7)),
    ("_add_holy_thursday", HelperDate::Easter(-3)),
    ("_add_good_friday", HelperDate::Easter(-2)),
    ("_add_holy_saturday", HelperDate::Easter(-1)),
    ("_add_easter_sunday", HelperDate::Easter(0)),
    ("_add_easter_monday", HelperDate::Easter(1)),
    ("_add_ascension_thursday", HelperDate::Easter(39)),
    ("_add_whit_sunday", HelperDate::Easter(49)),
    ("_add_whit_monday", HelperDate::Easter(50)),
    ("_add_corpus_christi_day", HelperDate::Easter(60)),
];

type BuildFn = fn(&Captures<'_>, &str) -> (RegistrationMethod, DateExpression);

/// A named call shape.
pub struct ShapeRecognizer {
    pub name: &'static str,
    pattern: &'static LazyLock<Regex>,
    build: BuildFn,
}

/// Recognizers in priority order.
pub static SHAPES: [ShapeRecognizer; 5] = [
    ShapeRecognizer {
        name: "weekday",
        pattern: &WEEKDAY_CALL,
        build: build_weekday,
    },
    ShapeRecognizer {
        name: "weekday",
        pattern: &WEEKDAY_NAMED,
        build: build_named_weekday,
    },
    ShapeRecognizer {
        name: "easter",
        pattern: &EASTER_CALL,
        build: build_easter,
    },
    ShapeRecognizer {
        name: "generic",
        pattern: &GENERIC_CALL,
        build: build_generic,
    },
    ShapeRecognizer {
        name: "helper",
        pattern: &HELPER_CALL,
        build: build_helper,
    },
];

impl ShapeRecognizer {
    /// Whether the line contains this shape's call opener.
    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Whether the call opened in `statement` has its closing parenthesis.
    #[must_use]
    pub fn is_closed(&self, statement: &str) -> bool {
        self.pattern
            .find(statement)
            .is_some_and(|m| find_closing_paren(statement, m.end() - 1).is_some())
    }

    /// Recognize one call. `None` when the shape does not match at all.
    pub fn recognize(
        &self,
        line_number: usize,
        statement: &str,
        source_line: &str,
    ) -> Option<Result<HolidayCall, ExtractError>> {
        let caps = self.pattern.captures(statement)?;
        let open = caps.get(0)?.end() - 1;
        let Some(close) = find_closing_paren(statement, open) else {
            return Some(Err(ExtractError::Unclosed {
                shape: self.name,
                line: line_number,
            }));
        };
        let args = &statement[open + 1..close];

        let Some((name, name_end)) = quoted_name(args) else {
            return Some(Err(ExtractError::MissingName {
                shape: self.name,
                line: line_number,
            }));
        };
        let rest = args[name_end..]
            .trim_start_matches(|c: char| c == ')' || c == ',' || c.is_whitespace())
            .trim_end();

        let (method, date) = (self.build)(&caps, rest);
        Some(Ok(HolidayCall {
            method,
            name,
            date,
            line_number,
            source_line: source_line.to_string(),
        }))
    }
}

fn build_weekday(_caps: &Captures<'_>, rest: &str) -> (RegistrationMethod, DateExpression) {
    (
        RegistrationMethod::WeekdayRelative,
        DateExpression::WeekdayBased {
            rule: rest.to_string(),
        },
    )
}

fn build_named_weekday(caps: &Captures<'_>, rest: &str) -> (RegistrationMethod, DateExpression) {
    let rule = caps
        .get(1)
        .map_or_else(|| rest.to_string(), |m| m.as_str().to_string());
    (
        RegistrationMethod::WeekdayRelative,
        DateExpression::WeekdayBased { rule },
    )
}

fn build_easter(_caps: &Captures<'_>, rest: &str) -> (RegistrationMethod, DateExpression) {
    let offset = SIGNED_INT
        .captures(rest)
        .and_then(|c| {
            let magnitude: i32 = c.get(2)?.as_str().parse().ok()?;
            let negative = c.get(1).is_some_and(|m| m.as_str() == "-");
            Some(if negative { -magnitude } else { magnitude })
        })
        .unwrap_or(0);
    (
        RegistrationMethod::EasterRelative,
        DateExpression::EasterBased { offset },
    )
}

fn build_generic(caps: &Captures<'_>, rest: &str) -> (RegistrationMethod, DateExpression) {
    let dated = caps.get(1).zip(caps.get(2)).and_then(|(month, day)| {
        month_number(month.as_str())?;
        let day: u32 = day.as_str().parse().ok()?;
        (1..=31).contains(&day).then(|| DateExpression::Fixed {
            month_token: month.as_str().to_string(),
            day,
        })
    });
    (
        RegistrationMethod::Generic,
        dated.unwrap_or_else(|| classify(rest)),
    )
}

fn build_helper(caps: &Captures<'_>, rest: &str) -> (RegistrationMethod, DateExpression) {
    let helper = caps
        .get(1)
        .and_then(|m| HELPERS.iter().find(|(name, _)| *name == m.as_str()));
    let date = match helper {
        Some((_, HelperDate::Fixed(month, day))) => DateExpression::Fixed {
            month_token: (*month).to_string(),
            day: *day,
        },
        Some((_, HelperDate::Easter(offset))) => DateExpression::EasterBased { offset: *offset },
        None => classify(rest),
    };
    (RegistrationMethod::Generic, date)
}

/// First non-empty quoted string in `args`, double quotes tried first.
///
/// Returns the unescaped name and the byte offset just past its closing
/// quote.
fn quoted_name(args: &str) -> Option<(String, usize)> {
    [&DOUBLE_QUOTED, &SINGLE_QUOTED].into_iter().find_map(|pattern| {
        let caps = pattern.captures(args)?;
        let whole = caps.get(0)?;
        let name = unescape(caps.get(1)?.as_str());
        let name = name.trim();
        (!name.is_empty()).then(|| (name.to_string(), whole.end()))
    })
}

/// Byte index of the parenthesis closing the one at `open`.
///
/// Parentheses inside string literals are ignored.
pub(crate) fn find_closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, c) in text.get(open..)?.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recognize(line: &str) -> Option<Result<HolidayCall, ExtractError>> {
        SHAPES
            .iter()
            .find(|shape| shape.is_match(line))
            .and_then(|shape| shape.recognize(1, line, line.trim()))
    }

    fn date_of(line: &str) -> DateExpression {
        recognize(line).unwrap().unwrap().date
    }

    #[test]
    fn test_generic_fixed_date() {
        let call = recognize(r#"        self._add_holiday("New Year's Day", date(year, JAN, 1))"#)
            .unwrap()
            .unwrap();
        assert_eq!(call.method, RegistrationMethod::Generic);
        assert_eq!(call.name, "New Year's Day");
        assert_eq!(
            call.date,
            DateExpression::Fixed {
                month_token: "JAN".to_string(),
                day: 1
            }
        );
        assert_eq!(
            call.source_line,
            r#"self._add_holiday("New Year's Day", date(year, JAN, 1))"#
        );
    }

    #[test]
    fn test_single_quoted_name() {
        let call = recognize(r"self._add_holiday('Labour Day', date(year, MAY, 1))")
            .unwrap()
            .unwrap();
        assert_eq!(call.name, "Labour Day");
    }

    #[test]
    fn test_escaped_quote_in_name() {
        let call = recognize(r"self._add_holiday('Saint\'s Day', date(year, MAR, 17))")
            .unwrap()
            .unwrap();
        assert_eq!(call.name, "Saint's Day");
    }

    #[test]
    fn test_dated_method_name() {
        assert_eq!(
            date_of(r#"self._add_holiday_oct_12(tr("National Day"))"#),
            DateExpression::Fixed {
                month_token: "oct".to_string(),
                day: 12
            }
        );
    }

    #[test]
    fn test_generic_calculated() {
        assert_eq!(
            date_of(r#"self._add_holiday("Bridge Day", self._get_bridge(year))"#),
            DateExpression::Calculated {
                raw: "self._get_bridge(year)".to_string()
            }
        );
    }

    #[test]
    fn test_easter_offsets() {
        assert_eq!(
            date_of(r#"self._add_easter_based_holiday("Good Friday", -2)"#),
            DateExpression::EasterBased { offset: -2 }
        );
        assert_eq!(
            date_of(r#"self._add_easter_based_holiday("Easter Monday", + 1)"#),
            DateExpression::EasterBased { offset: 1 }
        );
        assert_eq!(
            date_of(r#"self._add_easter_based_holiday(tr("Ascension Day"), days=39)"#),
            DateExpression::EasterBased { offset: 39 }
        );
        assert_eq!(
            date_of(r#"self._add_easter_based_holiday("Easter Sunday")"#),
            DateExpression::EasterBased { offset: 0 }
        );
    }

    #[test]
    fn test_weekday_rule_is_opaque() {
        let call = recognize(r#"self._add_weekday_based_holiday("Labor Day", SEP, MON, 1)"#)
            .unwrap()
            .unwrap();
        assert_eq!(call.method, RegistrationMethod::WeekdayRelative);
        assert_eq!(
            call.date,
            DateExpression::WeekdayBased {
                rule: "SEP, MON, 1".to_string()
            }
        );
    }

    #[test]
    fn test_named_weekday_method() {
        assert_eq!(
            date_of(r#"self._add_holiday_last_mon_of_may(tr("Memorial Day"))"#),
            DateExpression::WeekdayBased {
                rule: "last_mon_of_may".to_string()
            }
        );
        assert_eq!(
            date_of(r#"self._add_holiday_1st_mon_before_may_24(tr("Victoria Day"))"#),
            DateExpression::WeekdayBased {
                rule: "1st_mon_before_may_24".to_string()
            }
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(
            date_of(r#"self._add_good_friday(tr("Good Friday"))"#),
            DateExpression::EasterBased { offset: -2 }
        );
        assert_eq!(
            date_of(r#"self._add_christmas_day_two(tr("St. Stephen's Day"))"#),
            DateExpression::Fixed {
                month_token: "DEC".to_string(),
                day: 26
            }
        );
        assert_eq!(
            date_of(r#"self._add_christmas_day(tr("Christmas Day"))"#),
            DateExpression::Fixed {
                month_token: "DEC".to_string(),
                day: 25
            }
        );
    }

    #[test]
    fn test_missing_name_fails_the_call() {
        let result = recognize("self._add_holiday(name, date(year, JAN, 1))").unwrap();
        assert_eq!(
            result,
            Err(ExtractError::MissingName {
                shape: "generic",
                line: 1
            })
        );
    }

    #[test]
    fn test_unclosed_call_fails() {
        let result = recognize(r#"self._add_holiday("Broken", date(year, JAN, 1)"#).unwrap();
        assert_eq!(
            result,
            Err(ExtractError::Unclosed {
                shape: "generic",
                line: 1
            })
        );
    }

    #[test]
    fn test_unrelated_line() {
        assert!(recognize("super()._populate(year)").is_none());
        assert!(recognize("self._add_holidays_by_year(year)").is_none());
    }

    #[test]
    fn test_find_closing_paren_ignores_quoted_parens() {
        let text = r#"f("a)b", g(1), ')')"#;
        assert_eq!(find_closing_paren(text, 1), Some(text.len() - 1));
        assert_eq!(find_closing_paren("f(1, (2)", 1), None);
    }

    #[test]
    fn test_is_closed() {
        let shape = &SHAPES[3];
        assert!(shape.is_closed(r#"self._add_holiday("X", date(year, JAN, 1))"#));
        assert!(!shape.is_closed(r#"self._add_holiday("X","#));
    }
}
