use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::ColumnMap;
use crate::error::LoadError;
use crate::records::{Field, RawRow};

/// Reads exam rows from a CSV file with a header line. Every cell is text.
pub fn read_csv(path: &Path) -> Result<Vec<RawRow>, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| {
            let io_message = match source.kind() {
                csv::ErrorKind::Io(e) => Some(e.to_string()),
                _ => None,
            };
            match io_message {
                Some(message) => LoadError::Read {
                    path: path.to_path_buf(),
                    message,
                },
                None => csv_err(source),
            }
        })?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnMap::resolve(&headers, &path.display().to_string())?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let field = |col: usize| match record.get(col) {
            Some(s) if !s.is_empty() => Field::Text(s.to_string()),
            _ => Field::Empty,
        };
        let raw = RawRow {
            row: idx + 2,
            exam_date: field(columns.exam_date),
            exam_name: field(columns.exam_name),
            pass_point: field(columns.pass_point),
            result: field(columns.result),
        };
        if raw.is_blank() {
            continue;
        }
        rows.push(raw);
    }

    Ok(rows)
}
