//! Aggregate table model.
//!
//! An aggregation kind declares its columns as [`ColumnDef`]s; the
//! controller materializes query output into [`ColumnData`] containers
//! pre-sized to the row count, with string cells replaced by indices
//! into the result's interned string table.

use serde::{Deserialize, Serialize};

/// Declared type of an aggregate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Interned string cells.
    String,
    /// 64-bit integer cells.
    Integer,
    /// 64-bit float cells.
    Float,
    /// Integer nanosecond timestamps; sums are reported in
    /// milliseconds.
    TimestampNs,
}

/// One declared column of an aggregation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column id in the backing table.
    pub column_id: String,
    /// Display title.
    pub title: String,
    /// Declared cell type; selects the container variant.
    pub kind: ColumnKind,
    /// Whether a `sum()` over the backing table is reported.
    pub summable: bool,
}

/// Variant container for one materialized column.
///
/// String columns store `u32` indices into the result's string table.
/// `TimestampNs` columns share the integer container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// Indices into the result string table.
    String(Vec<u32>),
    /// Integer cells (also nanosecond timestamps).
    Integer(Vec<i64>),
    /// Float cells.
    Float(Vec<f64>),
}

impl ColumnData {
    /// Container for `kind`, with capacity for `rows` cells.
    pub fn for_kind(kind: ColumnKind, rows: usize) -> Self {
        match kind {
            ColumnKind::String => ColumnData::String(Vec::with_capacity(rows)),
            ColumnKind::Integer | ColumnKind::TimestampNs => {
                ColumnData::Integer(Vec::with_capacity(rows))
            }
            ColumnKind::Float => ColumnData::Float(Vec::with_capacity(rows)),
        }
    }

    /// Number of cells stored.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::String(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    /// Whether the container holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One materialized aggregate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateColumn {
    /// Column id in the backing table.
    pub column_id: String,
    /// Display title.
    pub title: String,
    /// Declared cell type.
    pub kind: ColumnKind,
    /// Cell container, one entry per row.
    pub data: ColumnData,
}

/// Kind-specific extra summary attached to an aggregate result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregateExtra {
    /// Per-state time breakdown for the thread-state aggregation.
    ThreadStates {
        /// State labels.
        states: Vec<String>,
        /// Time per state, milliseconds.
        values_ms: Vec<f64>,
        /// Total time across states, milliseconds.
        total_ms: f64,
    },
}

/// A fully materialized aggregate table for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// UI tab title.
    pub tab_name: String,
    /// Materialized columns, in declaration order.
    pub columns: Vec<AggregateColumn>,
    /// Formatted sum per declared column; empty string when the column
    /// is not summable.
    pub column_sums: Vec<String>,
    /// Interned string table, first-seen order. String cells index
    /// into it; indices are stable only within this result.
    pub strings: Vec<String>,
    /// Optional kind-specific summary.
    pub extra: Option<AggregateExtra>,
}

impl AggregateResult {
    /// The vacuous result: published for non-area selections and empty
    /// views.
    pub fn empty(tab_name: impl Into<String>) -> Self {
        AggregateResult {
            tab_name: tab_name.into(),
            columns: Vec::new(),
            column_sums: Vec::new(),
            strings: Vec::new(),
            extra: None,
        }
    }

    /// Whether this is the vacuous result.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
