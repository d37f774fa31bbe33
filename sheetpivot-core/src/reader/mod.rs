//! Excel/ODS sheet reader using calamine

use crate::error::{ConvertError, Result};
use calamine::{Data, Reader, Sheets, open_workbook_auto};
use std::path::Path;
use tracing::debug;

pub mod table;

pub use table::{CellValue, ColumnSchema, InputRow, ModelKey, RawTable};

/// Read one worksheet as a header row plus data rows.
///
/// With `sheet` unset the first worksheet is used. The first non-empty row
/// of the used range is the header.
pub fn read_table<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<RawTable> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = excel.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| ConvertError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ConvertError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?,
    };

    let range = excel
        .worksheet_range(&sheet_name)
        .map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| parse_cell_value(c).to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(parse_cell_value).collect())
        .collect();

    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        columns = headers.len(),
        rows = rows.len(),
        "read worksheet"
    );

    Ok(RawTable::new(headers, rows))
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(&Data::Float(0.5)), CellValue::Number(0.5));
        assert_eq!(parse_cell_value(&Data::Int(2)), CellValue::Number(2.0));
        assert_eq!(
            parse_cell_value(&Data::String("Voting".to_string())),
            CellValue::Text("Voting".to_string())
        );
        assert_eq!(parse_cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = read_table("/nonexistent/dir/results.xlsx", None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
