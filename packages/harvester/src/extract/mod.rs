//! Holiday-call extraction over raw source lines.
//!
//! Works on text rather than tokens so that gaps in the lexer never hide
//! a registration call. A call whose parentheses do not close on its first
//! line is joined with the following lines before recognition, stopping at
//! a line that opens another call.

mod call;
pub mod classify;
mod shapes;

use std::ops::RangeInclusive;

pub use call::{DateExpression, HolidayCall, RegistrationMethod};
pub use classify::{classify, month_number};
pub(crate) use shapes::find_closing_paren;
pub use shapes::{ShapeRecognizer, SHAPES};

/// Continuation lines joined onto a call that does not close on its own line.
const MAX_CONTINUATION_LINES: usize = 8;

/// Extract every recognizable call in `text`.
pub fn extract_calls(text: &str) -> Vec<HolidayCall> {
    scan(text, |_| true)
}

/// Extract calls that start on a line inside one of `ranges` (1-based,
/// inclusive).
pub fn extract_calls_in(text: &str, ranges: &[RangeInclusive<usize>]) -> Vec<HolidayCall> {
    scan(text, |line| ranges.iter().any(|r| r.contains(&line)))
}

/// Whether any line of `text` holds a recognized call opener.
#[must_use]
pub fn contains_registration_call(text: &str) -> bool {
    text.lines().any(opens_call)
}

fn opens_call(line: &str) -> bool {
    !is_comment(line) && SHAPES.iter().any(|shape| shape.is_match(line))
}

fn scan(text: &str, include: impl Fn(usize) -> bool) -> Vec<HolidayCall> {
    let lines: Vec<&str> = text.lines().collect();
    let mut calls = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;
        if !include(line_number) || is_comment(line) {
            continue;
        }
        let Some(shape) = SHAPES.iter().find(|shape| shape.is_match(line)) else {
            continue;
        };

        let statement = join_statement(&lines, index, shape);
        match shape.recognize(line_number, &statement, line.trim()) {
            Some(Ok(call)) => {
                tracing::trace!(
                    line = line_number,
                    method = call.method.as_str(),
                    shape = shape.name,
                    "recognized holiday call"
                );
                calls.push(call);
            }
            Some(Err(e)) => {
                skipped += 1;
                tracing::debug!(error = %e, "skipping malformed call");
            }
            None => {}
        }
    }

    tracing::debug!(calls = calls.len(), skipped, "extracted holiday calls");
    calls
}

fn join_statement(lines: &[&str], start: usize, shape: &ShapeRecognizer) -> String {
    let mut statement = lines[start].to_string();
    for next in lines.iter().skip(start + 1).take(MAX_CONTINUATION_LINES) {
        if shape.is_closed(&statement) || opens_call(next) {
            break;
        }
        statement.push('\n');
        statement.push_str(next);
    }
    statement
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"class Spain(HolidayBase):
    def _populate(self, year):
        self._add_holiday("New Year's Day", date(year, JAN, 1))
        self._add_holiday(name, date(year, JAN, 6))
        self._add_easter_based_holiday("Good Friday", -2)
        # self._add_holiday("Commented Out", date(year, FEB, 2))
        self._add_holiday(
            "Christmas Day",
            date(year, DEC, 25),
        )
        self._add_holiday(tr("Fiesta Nacional"), date(year, OCT, 12))
"#;

    #[test]
    fn test_extract_skips_malformed_and_comments() {
        let calls = extract_calls(SOURCE);
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["New Year's Day", "Good Friday", "Christmas Day", "Fiesta Nacional"]
        );
    }

    #[test]
    fn test_multi_line_call() {
        let calls = extract_calls(SOURCE);
        let christmas = calls.iter().find(|c| c.name == "Christmas Day").unwrap();
        assert_eq!(christmas.line_number, 7);
        assert_eq!(christmas.source_line, "self._add_holiday(");
        assert_eq!(
            christmas.date,
            DateExpression::Fixed {
                month_token: "DEC".to_string(),
                day: 25
            }
        );
    }

    #[test]
    fn test_extract_in_ranges() {
        let calls = extract_calls_in(SOURCE, &[1..=5]);
        assert_eq!(calls.len(), 2);
        assert!(extract_calls_in(SOURCE, &[]).is_empty());
    }

    #[test]
    fn test_unclosed_call_does_not_swallow_next_call() {
        let text = r#"class Spain(HolidayBase):
    def _populate(self, year):
        self._add_holiday(name, date(year, JAN, 2)
        self._add_holiday("Two", date(year, FEB, 1))
"#;
        let calls = extract_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "Two");
        assert_eq!(calls[0].line_number, 4);
        assert_eq!(
            calls[0].date,
            DateExpression::Fixed {
                month_token: "FEB".to_string(),
                day: 1
            }
        );
    }

    #[test]
    fn test_unclosed_named_call_is_skipped() {
        let text = "self._add_holiday(\"Broken\", date(year, MAR, 3)\nx = 1\nself._add_easter_based_holiday(\"Good Friday\", -2)\n";
        let names: Vec<String> = extract_calls(text).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Good Friday"]);
    }

    #[test]
    fn test_contains_registration_call() {
        assert!(contains_registration_call(SOURCE));
        assert!(!contains_registration_call(
            "# self._add_holiday(\"X\", date(year, JAN, 1))\nx = 1\n"
        ));
    }
}
