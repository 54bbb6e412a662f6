//! # Tracedeck
//!
//! Control layer mediating between a UI state store and a
//! trace-processing query engine.
//!
//! Tracedeck does not execute SQL, draw tracks, or own UI state; it
//! decides *when* queries are issued and *how* their results are
//! transformed. The host supplies the four collaborators — a state
//! store, a publisher, an engine factory, and the track/aggregation
//! registries — and drives one [`Session::tick`] per state change.
//!
//! ## Quick start
//!
//! ```ignore
//! use tracedeck::prelude::*;
//!
//! let tracks = Arc::new(TrackRegistry::new());
//! let aggregations = Arc::new(AggregationRegistry::new());
//! aggregations.register("cpu_by_thread", Arc::new(CpuByThread));
//!
//! let mut session = Session::new(store, publisher, engines, tracks, aggregations);
//!
//! // On every store change:
//! session.tick()?;
//! ```
//!
//! Each tick reconciles the controller tree against the store
//! snapshot: one trace lifecycle controller per opened trace, which —
//! once its trace is ingested and ready — spawns per-track, per-query
//! and per-aggregation-kind children.

#![warn(missing_docs)]

mod error;
mod session;

pub mod prelude;

pub use error::{Error, Result};
pub use session::Session;

// Re-export the boundary surface.
pub use tracedeck_controller::{
    AggregationController, AggregationRegistry, AggregationSpec, ChildSpec, Command, Controller,
    ControllerContext, ControllerTree, Event, Publisher, StateStore, StoreSnapshot, TraceController,
    TrackArgs, TrackRegistry,
};
pub use tracedeck_core as core;
pub use tracedeck_engine::{
    ColumnValues, Engine, EngineError, EngineFactory, QueryColumn, QueryResult, QueryValue,
};
