//! Core data model shared by the tracedeck control layer.
//!
//! This crate defines the types exchanged between the controllers, the
//! query engine boundary, and the presentation layer:
//!
//! - [`TimeSpan`]: trace time bounds with nanosecond bucket helpers
//! - [`Area`] / [`Selection`] / [`Sorting`]: selection snapshots
//! - [`TrackDescriptor`] / [`TrackGroupDescriptor`]: derived
//!   visualization entities
//! - [`ThreadDesc`] / [`QuantizedLoad`]: published thread list and
//!   overview samples
//! - [`ColumnDef`] / [`AggregateResult`]: the aggregate table model
//! - [`StringInterner`]: per-result deduplicated string table
//!
//! None of these types perform I/O; they are plain data carried across
//! the command/event boundaries.

mod aggregation;
mod intern;
mod selection;
mod time;
mod track;
mod types;

pub use aggregation::{
    AggregateColumn, AggregateExtra, AggregateResult, ColumnData, ColumnDef, ColumnKind,
};
pub use intern::StringInterner;
pub use selection::{Area, AreaId, Selection, SortDirection, Sorting};
pub use time::TimeSpan;
pub use track::{
    TrackConfig, TrackDescriptor, TrackGroupDescriptor, TrackId, CPU_SLICE_TRACK_KIND,
    PROCESS_SUMMARY_TRACK_KIND, SCROLLING_TRACK_GROUP, SLICE_TRACK_KIND, VSYNC_TRACK_KIND,
};
pub use types::{EngineConfig, QuantizedLoad, ThreadDesc, TraceSource};
