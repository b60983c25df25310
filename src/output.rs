//! Output formatting and persistence for finished reports.
//!
//! Reports go to xlsx or CSV files. Both sinks build the whole file in memory,
//! stage it as `<file>.tmp` and move it into place with a rename, so a failure
//! never leaves a half-written report behind.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::error::WriteError;
use crate::report::{Cell, ReportTable};

/// Destination for a finished [`ReportTable`].
pub trait TableSink {
    /// Where the table ends up, for logs and messages.
    fn location(&self) -> String;

    /// Renders the table next to its destination without replacing anything.
    fn stage(&self, table: &ReportTable) -> Result<StagedReport, WriteError>;

    fn write_table(&self, table: &ReportTable) -> Result<(), WriteError> {
        self.stage(table)?.commit()
    }
}

/// A fully rendered report waiting in `<file>.tmp`.
///
/// [`StagedReport::commit`] renames it into place. Dropping it uncommitted
/// removes the temporary file.
#[must_use]
#[derive(Debug)]
pub struct StagedReport {
    tmp: Option<PathBuf>,
    path: PathBuf,
}

impl StagedReport {
    /// Writes `bytes` to `<path>.tmp`, creating the parent directory.
    pub fn stage(path: &Path, bytes: &[u8]) -> Result<Self, WriteError> {
        let io_err = |source: std::io::Error| WriteError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        // constructed before the write so a failed write is cleaned up on drop
        let staged = Self {
            tmp: Some(tmp.clone()),
            path: path.to_path_buf(),
        };
        fs::write(&tmp, bytes).map_err(io_err)?;
        debug!(path = %tmp.display(), bytes = bytes.len(), "Report staged");
        Ok(staged)
    }

    /// For sinks that keep nothing on disk; committing does nothing.
    pub fn written(location: impl Into<PathBuf>) -> Self {
        Self {
            tmp: None,
            path: location.into(),
        }
    }

    pub fn commit(mut self) -> Result<(), WriteError> {
        let Some(tmp) = self.tmp.take() else {
            return Ok(());
        };
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(WriteError::Io {
                path: self.path.clone(),
                source,
            });
        }
        debug!(path = %self.path.display(), "Report committed");
        Ok(())
    }
}

impl Drop for StagedReport {
    fn drop(&mut self) {
        if let Some(tmp) = self.tmp.take() {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Builds the sink for `format`, writing `<dir>/<stem>.<ext>`.
pub fn sink_for(format: OutputFormat, dir: &Path, stem: &str) -> Box<dyn TableSink> {
    let path = dir.join(format!("{stem}.{}", format.extension()));
    match format {
        OutputFormat::Xlsx => Box::new(XlsxSink::new(path)),
        OutputFormat::Csv => Box::new(CsvSink::new(path)),
    }
}

/// Logs a table using Rust's debug pretty-print format.
pub fn print_pretty(table: &ReportTable) {
    debug!("{:#?}", table);
}

/// Logs a table as pretty-printed JSON.
pub fn print_json(table: &ReportTable) -> Result<(), serde_json::Error> {
    info!("{}", serde_json::to_string_pretty(table)?);
    Ok(())
}

/// Writes a single-sheet xlsx workbook.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&table.title)?;

        let bold = Format::new().set_bold();
        let two_places = Format::new().set_num_format("0.00");

        for (col, label) in table.header().enumerate() {
            sheet.write_string_with_format(0, col as u16, label, &bold)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (col, cell) in row.index.iter().chain(row.values.iter()).enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Blank => {}
                    Cell::Text(s) => {
                        sheet.write_string(r, col, s)?;
                    }
                    Cell::Integer(i) => {
                        sheet.write_number(r, col, *i as f64)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number_with_format(r, col, *n, &two_places)?;
                    }
                }
            }
        }

        workbook.save_to_buffer()
    }
}

impl TableSink for XlsxSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn stage(&self, table: &ReportTable) -> Result<StagedReport, WriteError> {
        let bytes = self.render(table).map_err(|source| WriteError::Xlsx {
            path: self.path.clone(),
            source,
        })?;
        StagedReport::stage(&self.path, &bytes)
    }
}

/// Writes the table as CSV. Numbers always carry two decimals; blank cells
/// are empty fields.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, WriteError> {
        let csv_err = |source: csv::Error| WriteError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(table.header()).map_err(csv_err)?;
        for row in &table.rows {
            writer
                .write_record(row.index.iter().chain(row.values.iter()).map(render_cell))
                .map_err(csv_err)?;
        }

        writer.into_inner().map_err(|e| WriteError::Io {
            path: self.path.clone(),
            source: e.into_error(),
        })
    }
}

impl TableSink for CsvSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn stage(&self, table: &ReportTable) -> Result<StagedReport, WriteError> {
        let bytes = self.render(table)?;
        StagedReport::stage(&self.path, &bytes)
    }
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Blank => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Integer(i) => i.to_string(),
        Cell::Number(n) => format!("{n:.2}"),
    }
}
