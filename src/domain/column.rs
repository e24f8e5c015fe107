// ============================================================
// SAMPLE COLUMNS
// ============================================================
// Column-wise view of an uploaded sample and the metadata inferred from it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target column type decided from sample values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Timestamp,
    Text,
}

impl ColumnType {
    /// Warehouse type name emitted into DDL and field metadata
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "NUMBER(38,0)",
            ColumnType::Timestamp => "TIMESTAMP_NTZ",
            ColumnType::Text => "VARCHAR(255)",
        }
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Text
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// One column of the sample, absent cells kept as `None`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSample {
    /// Header text (trimmed)
    pub name: String,

    /// 1-based position within the table
    pub position: usize,

    pub values: Vec<Option<String>>,
}

impl ColumnSample {
    pub fn new(name: impl Into<String>, position: usize, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            position,
            values,
        }
    }

    /// Values with absent cells removed
    pub fn present_values(&self) -> Vec<&str> {
        self.values.iter().flatten().map(String::as_str).collect()
    }
}

/// Sample file reshaped into columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    pub columns: Vec<ColumnSample>,

    /// Number of data rows (header excluded)
    pub row_count: usize,
}

impl SampleTable {
    /// Build from a header row and data rows.
    ///
    /// Short rows are padded with absent values; blank headers are named
    /// after their position. A sample without data rows has no columns.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, header)| {
                let header = header.trim();
                let name = if header.is_empty() {
                    format!("column_{}", idx + 1)
                } else {
                    header.to_string()
                };
                let values = rows
                    .iter()
                    .map(|row| row.get(idx).cloned().flatten())
                    .collect();
                ColumnSample::new(name, idx + 1, values)
            })
            .collect();

        Self {
            columns,
            row_count: rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Per-column result of type inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredColumn {
    pub name: String,
    pub position: usize,
    pub column_type: ColumnType,

    /// Longest observed value in characters; `None` for empty columns
    pub max_length: Option<usize>,

    /// Every row holds a distinct, non-null value
    pub primary_key: bool,
}
