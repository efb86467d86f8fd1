use serde::Serialize;

/// Registration idiom a call was recognized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationMethod {
    /// `_add_holiday(...)`, its dated variants and named helpers.
    Generic,

    /// `_add_easter_based_holiday(...)`.
    EasterRelative,

    /// Weekday-relative registration (nth weekday of a month).
    WeekdayRelative,
}

impl RegistrationMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::EasterRelative => "easter_relative",
            Self::WeekdayRelative => "weekday_relative",
        }
    }
}

/// How a holiday's date is computed, as recovered from the call site.
///
/// `month_token` is kept as written (`JAN`, `jan` or `1`) and normalized by
/// the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DateExpression {
    Fixed { month_token: String, day: u32 },
    EasterBased { offset: i32 },
    WeekdayBased { rule: String },
    Calculated { raw: String },
}

/// One recognized rule-registration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayCall {
    pub method: RegistrationMethod,
    pub name: String,
    pub date: DateExpression,

    /// 1-based line the call starts on.
    pub line_number: usize,

    /// The physical source line the call starts on, trimmed.
    pub source_line: String,
}
