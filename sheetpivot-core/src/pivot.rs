//! Long-to-wide reshaping of evaluation results
//!
//! Rows are keyed by model combination in first-seen order, and every
//! recognized method becomes one column. The per-method projections are
//! folded onto the row index as left joins, so a model tested under only
//! some methods still gets a row with blank cells for the rest.

use crate::error::Result;
use crate::reader::{CellValue, ColumnSchema, InputRow, ModelKey, RawTable};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Methods reported when no list is configured, in output column order
pub const DEFAULT_METHODS: [&str; 5] = ["Voting", "Averaging", "Bagging", "Stacking", "AdaBoost"];

/// Ordered set of recognized method names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    names: Vec<String>,
}

impl MethodSet {
    /// Build a set from names, keeping the first occurrence of duplicates
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::new(DEFAULT_METHODS)
    }
}

/// One output row: the model cell and one cell per method
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub model: CellValue,
    pub cells: Vec<CellValue>,
}

/// Wide table with one row per model combination and one column per method
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub key_column: String,
    pub methods: MethodSet,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Key column plus one column per method
    pub fn column_count(&self) -> usize {
        1 + self.methods.len()
    }

    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.key_column.as_str())
            .chain(self.methods.iter())
            .collect()
    }

    pub fn row(&self, model_key: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.model.to_string() == model_key)
    }

    /// Cell for a model key and method, `None` if either is unknown
    pub fn get(&self, model_key: &str, method: &str) -> Option<&CellValue> {
        let col = self.methods.position(method)?;
        self.row(model_key).and_then(|r| r.cells.get(col))
    }
}

/// A (model key, method) pair seen more than once in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub model: String,
    pub method: String,
}

/// Result of a reshape: the table plus what was overwritten or dropped
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub table: PivotTable,
    /// Pairs whose earlier value was replaced by a later row
    pub duplicates: Vec<Duplicate>,
    /// Distinct method names outside the method set, in first-seen order
    pub ignored_methods: Vec<String>,
}

/// Check the schema of a raw table and pivot it
pub fn reshape(table: &RawTable, schema: &ColumnSchema, methods: &MethodSet) -> Result<Pivot> {
    let rows = table.input_rows(schema)?;
    let mut pivot = pivot(&rows, methods);
    pivot.table.key_column = schema.model.clone();
    Ok(pivot)
}

/// Pivot long-format rows into one column per method.
///
/// Duplicate (model, method) pairs resolve last-seen-wins, even when the
/// later score is empty.
pub fn pivot(rows: &[InputRow], methods: &MethodSet) -> Pivot {
    // Row index: distinct model keys in first-seen order
    let mut index: HashMap<ModelKey, usize> = HashMap::new();
    let mut models: Vec<CellValue> = Vec::new();
    for row in rows {
        index.entry(row.model_key()).or_insert_with(|| {
            models.push(row.model.clone());
            models.len() - 1
        });
    }

    let (columns, duplicates) = methods.iter().fold(
        (Vec::with_capacity(methods.len()), Vec::new()),
        |(mut columns, mut duplicates), method| {
            let partial = project_method(rows, method, &mut duplicates);
            columns.push(left_join(&index, models.len(), partial));
            (columns, duplicates)
        },
    );

    let rows_out = models
        .into_iter()
        .enumerate()
        .map(|(i, model)| PivotRow {
            model,
            cells: columns.iter().map(|col: &Vec<CellValue>| col[i].clone()).collect(),
        })
        .collect::<Vec<_>>();

    let ignored_methods = ignored_methods(rows, methods);

    for dup in &duplicates {
        warn!(model = %dup.model, method = %dup.method, "duplicate entry, keeping last value");
    }
    if !ignored_methods.is_empty() {
        debug!(methods = ?ignored_methods, "ignoring unrecognized methods");
    }

    Pivot {
        table: PivotTable {
            key_column: ColumnSchema::default().model,
            methods: methods.clone(),
            rows: rows_out,
        },
        duplicates,
        ignored_methods,
    }
}

/// Partial mapping from model key to score for one method
fn project_method(
    rows: &[InputRow],
    method: &str,
    duplicates: &mut Vec<Duplicate>,
) -> HashMap<ModelKey, CellValue> {
    let mut partial = HashMap::new();
    for row in rows.iter().filter(|r| r.method == method) {
        let key = row.model_key();
        if partial.insert(key.clone(), row.score.clone()).is_some() {
            duplicates.push(Duplicate {
                model: key.text().to_string(),
                method: method.to_string(),
            });
        }
    }
    partial
}

/// Align a partial mapping to the row index; absent keys become empty cells
fn left_join(
    index: &HashMap<ModelKey, usize>,
    len: usize,
    partial: HashMap<ModelKey, CellValue>,
) -> Vec<CellValue> {
    let mut column = vec![CellValue::Empty; len];
    for (key, value) in partial {
        if let Some(&i) = index.get(&key) {
            column[i] = value;
        }
    }
    column
}

fn ignored_methods(rows: &[InputRow], methods: &MethodSet) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|r| r.method.as_str())
        .filter(|m| !m.is_empty() && !methods.contains(m))
        .filter(|m| seen.insert(*m))
        .map(str::to_string)
        .collect()
}
