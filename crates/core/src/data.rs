//! Tabular rows that feed the placeholder substitution.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Column whose value names the generated files.
pub const NAME_COLUMN: &str = "name";

/// A data source read into memory: the header plus every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Column names in header order.
    pub columns: Vec<String>,

    /// Records in source order.
    pub rows: Vec<Row>,
}

impl DataSet {
    /// Create a data set, checking that the mandatory `name` column exists
    /// and that no column name repeats.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if !columns.iter().any(|c| c == NAME_COLUMN) {
            return Err(Error::MissingNameColumn(NAME_COLUMN.to_string()));
        }
        // Each column maps to exactly one `{{column}}` token.
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].contains(column) {
                return Err(Error::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Position of a column in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Look up a row's value for a named column.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Result<&'a str> {
        self.column_index(column)
            .and_then(|idx| row.value(idx))
            .ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
                line: row.line,
            })
    }

    /// The row's `name` value.
    pub fn name_of<'a>(&self, row: &'a Row) -> Result<&'a str> {
        self.value(row, NAME_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One record from the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based line in the source file, used in diagnostics.
    pub line: usize,

    /// Field values in header order. May be shorter than the header.
    pub values: Vec<String>,
}

impl Row {
    /// Create a row from its line number and field values.
    pub fn new<I, S>(line: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Value at a column position.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}
