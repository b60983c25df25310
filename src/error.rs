//! Error taxonomy for the report pipeline.
//!
//! Each stage owns one error type so a failure can always be traced back to
//! the stage and the input that caused it.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read exam rows from a source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("{path} contains no worksheet")]
    NoWorksheet { path: PathBuf },

    #[error("worksheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("unsupported input format for {path} (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFormat { path: PathBuf },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failure to turn a raw row into a typed record.
#[derive(Error, Debug, PartialEq)]
pub enum NormalizationError {
    #[error("row {row}: cannot parse '{value}' in column '{column}' as a date")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: column '{column}' is empty")]
    MissingValue { row: usize, column: &'static str },
}

/// Failure to persist a finished report.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build workbook for {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("cannot write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Any failure of a full pipeline run, tagged with the failing stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load stage failed: {0}")]
    Load(#[from] LoadError),

    #[error("normalize stage failed: {0}")]
    Normalize(#[from] NormalizationError),

    #[error("write stage failed: {0}")]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_names_stage_and_input() {
        let err = PipelineError::from(NormalizationError::InvalidDate {
            row: 4,
            column: "exam_date",
            value: "soon".to_string(),
        });

        let message = err.to_string();
        assert!(message.starts_with("normalize stage failed"));
        assert!(message.contains("row 4"));
        assert!(message.contains("soon"));
    }

    #[test]
    fn test_missing_column_message() {
        let err = LoadError::MissingColumn {
            source_name: "exams.xlsx".to_string(),
            column: "exam_name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "exams.xlsx is missing required column 'exam_name'"
        );
    }
}
