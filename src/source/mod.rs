//! Record loading.
//!
//! [`RecordSource`] is the seam between the pipeline and wherever rows come
//! from. [`FileSource`] picks a reader from the file extension; spreadsheets go
//! through `calamine`, CSV through the `csv` crate.

mod delimited;
mod memory;
mod reader;
mod workbook;

pub use delimited::read_csv;
pub use memory::InMemorySource;
pub use reader::RecordSource;
pub use workbook::read_workbook;

use std::path::PathBuf;

use tracing::info;

use crate::error::LoadError;
use crate::records::{COL_EXAM_DATE, COL_EXAM_NAME, COL_PASS_POINT, COL_RESULT, RawRow};

/// Loads all rows from `source`.
pub fn load_rows<S: RecordSource + ?Sized>(source: &S) -> Result<Vec<RawRow>, LoadError> {
    let rows = source.read_rows()?;
    info!(source = %source.name(), rows = rows.len(), "Loaded exam rows");
    Ok(rows)
}

/// A spreadsheet or CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    /// Reads the named worksheet instead of the first one. Ignored for CSV.
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, LoadError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => {
                read_workbook(&self.path, self.sheet.as_deref())
            }
            Some("csv") => read_csv(&self.path),
            _ => Err(LoadError::UnsupportedFormat {
                path: self.path.clone(),
            }),
        }
    }
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub exam_date: usize,
    pub exam_name: usize,
    pub pass_point: usize,
    pub result: usize,
}

impl ColumnMap {
    /// Finds each required column by its trimmed header name. Extra columns
    /// are ignored; the first match wins on duplicates.
    pub fn resolve(headers: &[String], source_name: &str) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn {
                    source_name: source_name.to_string(),
                    column: name.to_string(),
                })
        };

        Ok(Self {
            exam_date: find(COL_EXAM_DATE)?,
            exam_name: find(COL_EXAM_NAME)?,
            pass_point: find(COL_PASS_POINT)?,
            result: find(COL_RESULT)?,
        })
    }
}

impl RawRow {
    pub(crate) fn is_blank(&self) -> bool {
        self.exam_date.is_empty()
            && self.exam_name.is_empty()
            && self.pass_point.is_empty()
            && self.result.is_empty()
    }
}
