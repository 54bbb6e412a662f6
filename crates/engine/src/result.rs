//! Query result model.
//!
//! Each column carries exactly one value representation, chosen once
//! per result by the engine: integers, floats, or strings. Callers
//! match on the variant (or use the typed accessors) instead of
//! probing parallel optional arrays.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// The cell values of one result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    /// 64-bit integers.
    Longs(Vec<i64>),
    /// 64-bit floats.
    Doubles(Vec<f64>),
    /// Strings.
    Strings(Vec<String>),
}

impl ColumnValues {
    fn repr(&self) -> &'static str {
        match self {
            ColumnValues::Longs(_) => "long",
            ColumnValues::Doubles(_) => "double",
            ColumnValues::Strings(_) => "string",
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Longs(v) => v.len(),
            ColumnValues::Doubles(v) => v.len(),
            ColumnValues::Strings(v) => v.len(),
        }
    }

    /// Whether the column holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One column of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryColumn {
    /// Column name as reported by the engine.
    pub name: String,
    /// Cell values.
    pub values: ColumnValues,
}

/// A fully buffered query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result columns, in select order.
    pub columns: Vec<QueryColumn>,
    /// Number of rows.
    pub num_records: usize,
}

impl QueryResult {
    /// An empty result with no columns.
    pub fn empty() -> Self {
        QueryResult {
            columns: Vec::new(),
            num_records: 0,
        }
    }

    /// Integer cells of column `idx`.
    pub fn longs(&self, idx: usize) -> Result<&[i64]> {
        match &self.column(idx)?.values {
            ColumnValues::Longs(v) => Ok(v),
            other => Err(EngineError::ColumnType {
                column: idx,
                expected: "long",
                actual: other.repr(),
            }),
        }
    }

    /// Float cells of column `idx`.
    pub fn doubles(&self, idx: usize) -> Result<&[f64]> {
        match &self.column(idx)?.values {
            ColumnValues::Doubles(v) => Ok(v),
            other => Err(EngineError::ColumnType {
                column: idx,
                expected: "double",
                actual: other.repr(),
            }),
        }
    }

    /// String cells of column `idx`.
    pub fn strings(&self, idx: usize) -> Result<&[String]> {
        match &self.column(idx)?.values {
            ColumnValues::Strings(v) => Ok(v),
            other => Err(EngineError::ColumnType {
                column: idx,
                expected: "string",
                actual: other.repr(),
            }),
        }
    }

    fn column(&self, idx: usize) -> Result<&QueryColumn> {
        self.columns.get(idx).ok_or(EngineError::ColumnType {
            column: idx,
            expected: "present",
            actual: "missing",
        })
    }
}

/// One scalar cell from a single-row query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    /// 64-bit integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// String.
    String(String),
    /// SQL NULL.
    Null,
}

impl QueryValue {
    /// Numeric view of the cell; NULL and strings read as 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            QueryValue::Long(v) => *v as f64,
            QueryValue::Double(v) => *v,
            QueryValue::String(_) | QueryValue::Null => 0.0,
        }
    }
}
