//! Record types flowing from the loader through normalization.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

/// Column holding the exam date.
pub const COL_EXAM_DATE: &str = "exam_date";
/// Column holding the exam name.
pub const COL_EXAM_NAME: &str = "exam_name";
/// Column holding the pass threshold percentage.
pub const COL_PASS_POINT: &str = "pass_point_percentage";
/// Column holding the achieved score percentage.
pub const COL_RESULT: &str = "result_percentage";

/// An untyped cell as it came out of the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Field {
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Empty => true,
            Field::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Empty => Ok(()),
            Field::Text(s) => f.write_str(s),
            Field::Number(n) => write!(f, "{n}"),
            Field::Date(d) => write!(f, "{d}"),
        }
    }
}

/// One input row before parsing. `row` is the 1-based line in the source,
/// header included, so it matches what a spreadsheet user sees.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row: usize,
    pub exam_date: Field,
    pub exam_name: Field,
    pub pass_point: Field,
    pub result: Field,
}

/// A single exam attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamRecord {
    pub date: NaiveDate,
    pub exam_name: String,
    pub pass_point_percentage: f64,
    pub result_percentage: f64,
}

/// Outcome of one attempt. A score of exactly 0 is a missed attempt, not a fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Passed,
    Failed,
    Missed,
}

impl Status {
    pub fn classify(pass_point: f64, result: f64) -> Self {
        if result == 0.0 {
            Status::Missed
        } else if result >= pass_point {
            Status::Passed
        } else {
            Status::Failed
        }
    }

    pub fn is_missed(self) -> bool {
        self == Status::Missed
    }
}

/// Calendar month bucket. Ordering is chronological, independent of how the
/// month is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Two-digit year and abbreviated month, e.g. `24-Jan`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%y-%b"))
    }
}

/// An [`ExamRecord`] with its derived grouping keys and outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: ExamRecord,
    pub month: YearMonth,
    pub year: i32,
    pub status: Status,
    /// `<exam_name>-<pass_point>`, e.g. `A-66`.
    pub exam_type: String,
}

/// Renders a threshold the way it appears in exam type labels: integral
/// values without a fraction, everything else in shortest form.
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
