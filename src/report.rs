//! Shapes aggregate cells into the final presentational tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::analyzers::types::{MonthlyCell, YearlyCell};
use crate::analyzers::utility::round2;
use crate::records::YearMonth;

/// File name of the monthly pass-rate pivot, without extension.
pub const MONTHLY_REPORT_STEM: &str = "monthly_pass_rates_by_exam_type";
/// File name of the yearly exam analysis, without extension.
pub const YEARLY_REPORT_STEM: &str = "exam_analysis_results";

pub const YEARLY_COLUMNS: [&str; 6] = [
    "Total Exams Taken",
    "Missed Exams Count",
    "Average Pass Point",
    "Average Score",
    "Pass Rate (%)",
    "Fail Rate (%)",
];

/// One cell of a finished report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Blank,
    Text(String),
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub index: Vec<Cell>,
    pub values: Vec<Cell>,
}

/// A finished two-dimensional report: index columns on the left, data
/// columns to the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub index_headers: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Header labels in output order.
    pub fn header(&self) -> impl Iterator<Item = &str> {
        self.index_headers
            .iter()
            .chain(self.columns.iter())
            .map(String::as_str)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.values.get(col)
    }
}

/// Pivots monthly cells: one row per month in chronological order, one
/// column per exam type. Months without data for an exam type stay blank.
pub fn shape_monthly(cells: &[MonthlyCell]) -> ReportTable {
    let columns: Vec<String> = cells
        .iter()
        .map(|c| c.exam_type().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut by_month: BTreeMap<YearMonth, Vec<Cell>> = BTreeMap::new();
    for cell in cells {
        let col = columns
            .iter()
            .position(|c| c == cell.exam_type())
            .unwrap_or_default();
        let row = by_month
            .entry(cell.month())
            .or_insert_with(|| vec![Cell::Blank; columns.len()]);
        row[col] = Cell::Number(round2(cell.pass_rate()));
    }

    // BTreeMap iteration is chronological; labels are rendered only now
    let rows = by_month
        .into_iter()
        .map(|(month, values)| ReportRow {
            index: vec![Cell::Text(month.label())],
            values,
        })
        .collect();

    ReportTable {
        title: "Monthly Pass Rates".to_string(),
        index_headers: vec!["Month".to_string()],
        columns,
        rows,
    }
}

/// One row per (year, exam name) with the fixed yearly statistic columns.
pub fn shape_yearly(cells: &[YearlyCell]) -> ReportTable {
    let rounded = |v: Option<f64>| v.map(|v| Cell::Number(round2(v))).unwrap_or(Cell::Blank);

    let rows = cells
        .iter()
        .map(|cell| ReportRow {
            index: vec![
                Cell::Integer(i64::from(cell.year())),
                Cell::Text(cell.exam_name().to_string()),
            ],
            values: vec![
                Cell::Integer(cell.total_count() as i64),
                Cell::Integer(cell.missed_count() as i64),
                rounded(cell.avg_pass_point()),
                rounded(cell.avg_score()),
                rounded(cell.pass_rate()),
                rounded(cell.fail_rate()),
            ],
        })
        .collect();

    ReportTable {
        title: "Exam Analysis".to_string(),
        index_headers: vec!["Year".to_string(), "Exam Name".to_string()],
        columns: YEARLY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}
