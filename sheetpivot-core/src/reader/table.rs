//! Long-format table data structures

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::{Discriminant, discriminant};

/// A single scalar cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Spreadsheet error literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Names of the three columns a long-format sheet must carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Model-combination key column
    pub model: String,
    /// Method-name column
    pub method: String,
    /// Scalar metric column
    pub score: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            model: "Models".to_string(),
            method: "Method".to_string(),
            score: "R2 Score".to_string(),
        }
    }
}

/// One observation of the long-format sheet
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub model: CellValue,
    pub method: String,
    pub score: CellValue,
}

impl InputRow {
    pub fn new(model: impl Into<CellValue>, method: impl Into<String>, score: impl Into<CellValue>) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
            score: score.into(),
        }
    }

    /// Identity of the row's model combination.
    ///
    /// An empty model cell maps to an empty key rather than being dropped.
    pub fn model_key(&self) -> ModelKey {
        ModelKey::of(&self.model)
    }
}

/// Identity of a model cell: its value kind plus display text.
///
/// A numeric `1` and a text `"1"` are different model combinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    kind: Discriminant<CellValue>,
    text: String,
}

impl ModelKey {
    pub fn of(value: &CellValue) -> Self {
        Self {
            kind: discriminant(value),
            text: value.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A header row plus data rows, as read from the first sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact, case-sensitive header lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| ConvertError::Schema {
            column: name.to_string(),
        })
    }

    /// Project the data rows onto the schema's three columns.
    ///
    /// Columns are checked in model, method, score order and the first
    /// missing one is reported. Short rows read as empty cells.
    pub fn input_rows(&self, schema: &ColumnSchema) -> Result<Vec<InputRow>> {
        let model_idx = self.require_column(&schema.model)?;
        let method_idx = self.require_column(&schema.method)?;
        let score_idx = self.require_column(&schema.score)?;

        let cell = |row: &[CellValue], idx: usize| row.get(idx).cloned().unwrap_or_default();

        Ok(self
            .rows
            .iter()
            .map(|row| InputRow {
                model: cell(row.as_slice(), model_idx),
                method: cell(row.as_slice(), method_idx).to_string(),
                score: cell(row.as_slice(), score_idx),
            })
            .collect())
    }
}
