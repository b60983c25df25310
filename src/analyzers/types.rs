//! Data types produced by the aggregation stage.

use crate::records::YearMonth;

/// Pass statistics for one (month, exam type) pair. Only non-missed attempts
/// are counted, so `total_count` is always at least one.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCell {
    pub(crate) month: YearMonth,
    pub(crate) exam_type: String,
    pub(crate) total_count: usize,
    pub(crate) passed_count: usize,
    /// Full precision; rounded when the report is shaped.
    pub(crate) pass_rate: f64,
}

impl MonthlyCell {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn exam_type(&self) -> &str {
        &self.exam_type
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    pub fn pass_rate(&self) -> f64 {
        self.pass_rate
    }
}

/// Statistics for one (year, exam name) pair.
///
/// Counts and means cover non-missed attempts only; `missed_count` is tracked
/// separately. The averages and rates are `None` when every attempt in the
/// group was missed.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyCell {
    pub(crate) year: i32,
    pub(crate) exam_name: String,
    pub(crate) total_count: usize,
    pub(crate) passed_count: usize,
    pub(crate) failed_count: usize,
    pub(crate) missed_count: usize,
    pub(crate) avg_pass_point: Option<f64>,
    pub(crate) avg_score: Option<f64>,
    pub(crate) pass_rate: Option<f64>,
    pub(crate) fail_rate: Option<f64>,
}

impl YearlyCell {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn exam_name(&self) -> &str {
        &self.exam_name
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn missed_count(&self) -> usize {
        self.missed_count
    }

    pub fn avg_pass_point(&self) -> Option<f64> {
        self.avg_pass_point
    }

    pub fn avg_score(&self) -> Option<f64> {
        self.avg_score
    }

    pub fn pass_rate(&self) -> Option<f64> {
        self.pass_rate
    }

    pub fn fail_rate(&self) -> Option<f64> {
        self.fail_rate
    }
}
