//! Turns raw rows into typed, classified records.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::NormalizationError;
use crate::records::{
    COL_EXAM_DATE, COL_EXAM_NAME, COL_PASS_POINT, COL_RESULT, ExamRecord, Field,
    NormalizedRecord, RawRow, Status, YearMonth, format_threshold,
};

// Slashed dates are US month-first; dotted dates are European day-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Normalizes every row, stopping at the first row that cannot be parsed.
pub fn normalize_all(rows: &[RawRow]) -> Result<Vec<NormalizedRecord>, NormalizationError> {
    let records = rows
        .iter()
        .map(normalize_row)
        .collect::<Result<Vec<_>, _>>()?;

    let missed = records.iter().filter(|r| r.status.is_missed()).count();
    let passed = records
        .iter()
        .filter(|r| r.status == Status::Passed)
        .count();
    debug!(
        records = records.len(),
        passed,
        failed = records.len() - passed - missed,
        missed,
        "Normalized exam records"
    );

    Ok(records)
}

pub fn normalize_row(raw: &RawRow) -> Result<NormalizedRecord, NormalizationError> {
    let record = ExamRecord {
        date: parse_date(raw.row, COL_EXAM_DATE, &raw.exam_date)?,
        exam_name: parse_name(raw.row, COL_EXAM_NAME, &raw.exam_name)?,
        pass_point_percentage: parse_number(raw.row, COL_PASS_POINT, &raw.pass_point)?,
        result_percentage: parse_number(raw.row, COL_RESULT, &raw.result)?,
    };

    for (column, value) in [
        (COL_PASS_POINT, record.pass_point_percentage),
        (COL_RESULT, record.result_percentage),
    ] {
        if !(0.0..=100.0).contains(&value) {
            warn!(row = raw.row, column, value, "Percentage outside 0-100");
        }
    }

    Ok(normalize(record))
}

/// Derives grouping keys and status for an already typed record.
pub fn normalize(record: ExamRecord) -> NormalizedRecord {
    let status = Status::classify(record.pass_point_percentage, record.result_percentage);
    let exam_type = format!(
        "{}-{}",
        record.exam_name,
        format_threshold(record.pass_point_percentage)
    );

    NormalizedRecord {
        month: YearMonth::from_date(record.date),
        year: record.date.year(),
        status,
        exam_type,
        record,
    }
}

fn parse_date(row: usize, column: &'static str, field: &Field) -> Result<NaiveDate, NormalizationError> {
    let invalid = || NormalizationError::InvalidDate {
        row,
        column,
        value: field.to_string(),
    };

    match field {
        Field::Empty => Err(NormalizationError::MissingValue { row, column }),
        Field::Date(dt) => Ok(dt.date()),
        Field::Number(serial) => from_excel_serial(*serial).ok_or_else(invalid),
        Field::Text(s) if s.trim().is_empty() => Err(NormalizationError::MissingValue { row, column }),
        Field::Text(s) => parse_date_text(s.trim()).ok_or_else(invalid),
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Excel stores dates as days since 1899-12-30; the fraction is the time of day.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_number(row: usize, column: &'static str, field: &Field) -> Result<f64, NormalizationError> {
    let invalid = || NormalizationError::InvalidNumber {
        row,
        column,
        value: field.to_string(),
    };

    let value = match field {
        Field::Empty => return Err(NormalizationError::MissingValue { row, column }),
        Field::Number(n) => *n,
        Field::Text(s) if s.trim().is_empty() => {
            return Err(NormalizationError::MissingValue { row, column });
        }
        Field::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        Field::Date(_) => return Err(invalid()),
    };

    if value.is_finite() { Ok(value) } else { Err(invalid()) }
}

fn parse_name(row: usize, column: &'static str, field: &Field) -> Result<String, NormalizationError> {
    let name = match field {
        Field::Number(n) => format_threshold(*n),
        other => other.to_string().trim().to_string(),
    };

    if name.is_empty() {
        Err(NormalizationError::MissingValue { row, column })
    } else {
        Ok(name)
    }
}
