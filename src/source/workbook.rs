use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use super::ColumnMap;
use crate::error::LoadError;
use crate::records::{Field, RawRow};

/// Reads the rows of one worksheet from a spreadsheet file.
///
/// Uses the first worksheet unless `sheet` names another one.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRow>, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let read_err = |e: calamine::Error| LoadError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|n| n == name) {
                return Err(LoadError::SheetNotFound {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            workbook.worksheet_range(name).map_err(read_err)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::NoWorksheet {
                path: path.to_path_buf(),
            })?
            .map_err(read_err)?,
    };

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => Vec::new(),
    };
    let columns = ColumnMap::resolve(&headers, &path.display().to_string())?;
    debug!(path = %path.display(), ?columns, "Resolved worksheet columns");

    let mut out = Vec::new();
    for (idx, cells) in rows.enumerate() {
        let field = |col: usize| cells.get(col).map(to_field).unwrap_or(Field::Empty);
        let raw = RawRow {
            // header is line first_row + 1, data starts one below it
            row: first_row + idx + 2,
            exam_date: field(columns.exam_date),
            exam_name: field(columns.exam_name),
            pass_point: field(columns.pass_point),
            result: field(columns.result),
        };
        if raw.is_blank() {
            continue;
        }
        out.push(raw);
    }

    Ok(out)
}

fn to_field(cell: &Data) -> Field {
    match cell {
        Data::Empty => Field::Empty,
        Data::String(s) => Field::Text(s.clone()),
        Data::Float(f) => Field::Number(*f),
        Data::Int(i) => Field::Number(*i as f64),
        Data::Bool(b) => Field::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Field::Date)
            .unwrap_or(Field::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Field::Text(s.clone()),
        Data::Error(e) => Field::Text(e.to_string()),
    }
}
