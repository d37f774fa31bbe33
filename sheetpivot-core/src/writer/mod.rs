//! Writer module for rendering pivot tables as styled spreadsheets

mod xlsx_writer;

pub use xlsx_writer::{CellReference, write_package};

use crate::error::{ConvertError, Result};
use crate::pivot::PivotTable;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::fs;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

/// Presentation settings for the output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    pub sheet_name: String,
    /// Text of cell A1
    pub corner_label: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet".to_string(),
            corner_label: "Method".to_string(),
        }
    }
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub destination: PathBuf,
    /// One per model combination
    pub data_rows: usize,
    /// Data rows plus the header row
    pub total_rows: usize,
    pub columns: usize,
}

/// Write a pivot table to `destination` as an XLSX document.
///
/// Empty cells and non-finite numbers are left blank.
///
/// The document is assembled in a temporary file next to the destination
/// and renamed over it only once complete, so a failed write never leaves
/// a truncated file behind. Concurrent writers to the same destination are
/// not coordinated; the last rename wins.
pub fn write<P: AsRef<Path>>(
    table: &PivotTable,
    destination: P,
    options: &WriterOptions,
) -> Result<WriteResult> {
    let destination = destination.as_ref();
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = temp_file_for(dir, destination)?;
    debug!(tmp = %tmp.path().display(), "writing package to temporary file");

    write_package(table, options, tmp.as_file_mut())?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ConvertError::io(tmp.path(), e))?;

    tmp.persist(destination)
        .map_err(|e| ConvertError::io(destination, e.error))?;

    let result = WriteResult {
        destination: destination.to_path_buf(),
        data_rows: table.row_count(),
        total_rows: table.row_count() + 1,
        columns: table.column_count(),
    };
    info!(
        destination = %destination.display(),
        rows = result.total_rows,
        columns = result.columns,
        "wrote converted workbook"
    );
    Ok(result)
}

/// Temporary file in `dir` whose permissions match what `destination` ends
/// up with under a plain create: the existing file's mode when overwriting,
/// otherwise `0o666` reduced by the process umask.
fn temp_file_for(dir: &Path, destination: &Path) -> Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".sheetpivot-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder
        .tempfile_in(dir)
        .map_err(|e| ConvertError::io(dir, e))?;

    if let Ok(existing) = fs::metadata(destination) {
        if existing.is_file() {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| ConvertError::io(tmp.path(), e))?;
        }
    }
    Ok(tmp)
}

/// Output path for an input file: `<stem><suffix>.xlsx` next to the input
pub fn output_path_for<P: AsRef<Path>>(input: P, suffix: &str) -> PathBuf {
    let input = input.as_ref();
    let mut name: OsString = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    name.push(".xlsx");
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_xlsx() {
        assert_eq!(
            output_path_for("/data/results.xlsx", "_converted"),
            PathBuf::from("/data/results_converted.xlsx")
        );
        assert_eq!(
            output_path_for("scores.v2.xlsx", "_converted"),
            PathBuf::from("scores.v2_converted.xlsx")
        );
    }

    #[test]
    fn test_output_path_for_other_formats_is_xlsx() {
        assert_eq!(
            output_path_for("/data/results.ods", "_wide"),
            PathBuf::from("/data/results_wide.xlsx")
        );
        assert_eq!(
            output_path_for("/data/results", "_converted"),
            PathBuf::from("/data/results_converted.xlsx")
        );
    }
}
