//! Column materialization.
//!
//! Raw query columns carry one tagged value representation each; the
//! declared [`ColumnDef`] kind picks the container variant, pre-sized
//! to the row count. String cells are replaced by indices into the
//! per-result interner.

use tracedeck_core::{AggregateColumn, ColumnData, ColumnDef, StringInterner};
use tracedeck_engine::{ColumnValues, EngineError, QueryResult};

use crate::error::{ControllerError, Result};

/// Materialize every declared column from `result`.
///
/// Integer query columns are accepted into float containers (the
/// engine may fold an integer expression); every other kind mismatch
/// is an error.
pub(crate) fn materialize_columns(
    defs: &[ColumnDef],
    result: &QueryResult,
    interner: &mut StringInterner,
) -> Result<Vec<AggregateColumn>> {
    let rows = result.num_records;
    let mut columns = Vec::with_capacity(defs.len());

    for (idx, def) in defs.iter().enumerate() {
        let mut data = ColumnData::for_kind(def.kind, rows);

        let values = match result.columns.get(idx) {
            Some(col) => &col.values,
            // A zero-row result may omit columns entirely; the
            // containers stay empty.
            None if rows == 0 => {
                columns.push(finish(def, data));
                continue;
            }
            None => {
                return Err(ControllerError::Engine(EngineError::ColumnType {
                    column: idx,
                    expected: "present",
                    actual: "missing",
                }))
            }
        };

        match (&mut data, values) {
            (ColumnData::String(out), ColumnValues::Strings(cells)) => {
                out.extend(cells.iter().map(|s| interner.intern(s)));
            }
            (ColumnData::Integer(out), ColumnValues::Longs(cells)) => {
                out.extend_from_slice(cells);
            }
            (ColumnData::Float(out), ColumnValues::Doubles(cells)) => {
                out.extend_from_slice(cells);
            }
            (ColumnData::Float(out), ColumnValues::Longs(cells)) => {
                out.extend(cells.iter().map(|&v| v as f64));
            }
            (_, values) => {
                let actual = match values {
                    ColumnValues::Longs(_) => "long",
                    ColumnValues::Doubles(_) => "double",
                    ColumnValues::Strings(_) => "string",
                };
                return Err(ControllerError::Engine(EngineError::ColumnType {
                    column: idx,
                    expected: kind_repr(def),
                    actual,
                }));
            }
        }

        columns.push(finish(def, data));
    }

    Ok(columns)
}

fn finish(def: &ColumnDef, data: ColumnData) -> AggregateColumn {
    AggregateColumn {
        column_id: def.column_id.clone(),
        title: def.title.clone(),
        kind: def.kind,
        data,
    }
}

fn kind_repr(def: &ColumnDef) -> &'static str {
    match def.kind {
        tracedeck_core::ColumnKind::String => "string",
        tracedeck_core::ColumnKind::Integer | tracedeck_core::ColumnKind::TimestampNs => "long",
        tracedeck_core::ColumnKind::Float => "double",
    }
}
