//! sheetpivot-core: pivot long-format evaluation sheets into wide tables
//!
//! Reads a sheet with one row per (model combination, method) observation,
//! reshapes it into one row per model combination with one column per
//! method, and writes the result as a styled XLSX workbook.

pub mod config;
pub mod error;
pub mod logging;
pub mod pivot;
pub mod progress;
pub mod reader;
pub mod session;
pub mod writer;

pub use config::{ConverterConfig, OutputConfig};
pub use error::{ConvertError, ErrorKind};
pub use pivot::{DEFAULT_METHODS, Duplicate, MethodSet, Pivot, PivotRow, PivotTable, pivot, reshape};
pub use progress::{FnSink, NullSink, ProgressEvent, ProgressSink, Severity, TracingSink};
pub use reader::{CellValue, ColumnSchema, InputRow, ModelKey, RawTable, read_table};
pub use session::{Session, SessionState, convert_file};
pub use writer::{WriteResult, WriterOptions, output_path_for, write};
