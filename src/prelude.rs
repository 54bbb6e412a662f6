//! Convenience re-exports for hosts embedding the control layer.

pub use std::sync::Arc;

pub use crate::{Error, Result, Session};
pub use tracedeck_controller::{
    AggregationRegistry, AggregationSpec, Command, Event, Publisher, StateStore, StoreSnapshot,
    TrackArgs, TrackRegistry,
};
pub use tracedeck_core::{
    AggregateResult, Area, ColumnDef, ColumnKind, EngineConfig, QuantizedLoad, Selection,
    SortDirection, Sorting, ThreadDesc, TimeSpan, TraceSource,
};
pub use tracedeck_engine::{
    ColumnValues, Engine, EngineError, EngineFactory, QueryColumn, QueryResult, QueryValue,
};
