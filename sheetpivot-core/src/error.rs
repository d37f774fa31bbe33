//! Error types for conversions

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a sheet
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A required column is missing from the input header
    #[error("\"{column}\" column not found in the file")]
    Schema { column: String },

    /// The input workbook could not be opened or parsed
    #[error("failed to read workbook {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// The workbook has no worksheets at all
    #[error("workbook {} has no worksheets", path.display())]
    EmptyWorkbook { path: PathBuf },

    /// The requested worksheet does not exist
    #[error("worksheet '{sheet}' not found in {}", path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    /// Filesystem error on the given path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP packaging error while writing the output document
    #[error("ZIP error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// `convert` was called before an input file was selected
    #[error("no input file selected")]
    NoInputSelected,
}

/// Coarse classification of a [`ConvertError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Io,
    Config,
    Usage,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Schema { .. } => ErrorKind::Schema,
            ConvertError::Read { .. }
            | ConvertError::EmptyWorkbook { .. }
            | ConvertError::SheetNotFound { .. }
            | ConvertError::Io { .. }
            | ConvertError::Archive(_) => ErrorKind::Io,
            ConvertError::Config(_) => ErrorKind::Config,
            ConvertError::NoInputSelected => ErrorKind::Usage,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_names_column() {
        let err = ConvertError::Schema {
            column: "Models".to_string(),
        };
        assert_eq!(err.to_string(), "\"Models\" column not found in the file");
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_io_class_errors() {
        let err = ConvertError::io(
            "/tmp/out.xlsx",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("/tmp/out.xlsx"));

        let err = ConvertError::SheetNotFound {
            path: PathBuf::from("in.xlsx"),
            sheet: "Results".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
