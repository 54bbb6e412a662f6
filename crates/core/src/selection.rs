//! Selection snapshots: areas and sort preferences.

use serde::{Deserialize, Serialize};

use crate::time::TimeSpan;
use crate::track::TrackId;

/// Identifier of an area in the store's area map.
pub type AreaId = String;

/// The current selection as observed from the state store.
///
/// Only area selections drive aggregation; every other variant makes
/// the aggregation controllers publish an empty table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// A time range plus track set selection.
    Area {
        /// Key into the store's area map.
        area_id: AreaId,
    },
    /// A single slice selection.
    Slice {
        /// Slice id within the engine.
        id: i64,
    },
    /// A single counter sample selection.
    Counter {
        /// Counter sample id within the engine.
        id: i64,
    },
}

/// An immutable area snapshot.
///
/// The store replaces the whole `Arc<Area>` on every selection change;
/// controllers detect change by pointer identity, never by deep
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Selected time range.
    pub time: TimeSpan,
    /// Tracks covered by the selection.
    pub tracks: Vec<TrackId>,
}

/// Sort direction for an aggregate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// SQL rendering of the direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort preference for one aggregation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    /// Column id to order by.
    pub column: String,
    /// Direction to order in.
    pub direction: SortDirection,
}

impl Sorting {
    /// Render as a SQL `order by` fragment, e.g. `total_dur DESC`.
    pub fn as_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}
