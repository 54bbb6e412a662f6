//! Asynchronous orchestration between the state store and the query
//! engine.
//!
//! Two controller families do the real work:
//!
//! - [`TraceController`]: one per opened trace. Streams the raw bytes
//!   into the engine, derives the default track layout, publishes the
//!   thread list and the timeline overview, then reconciles per-track
//!   and per-query child controllers on every tick.
//! - [`AggregationController`]: one per aggregation kind. Watches the
//!   current area selection and sort preference, and on change fetches
//!   and materializes a typed, string-interned aggregate table with
//!   at-most-one-in-flight coalescing.
//!
//! ## Reconciliation model
//!
//! Controllers are polled with cheap, non-blocking [`Controller::run`]
//! calls on every state tick. A tick never interrupts asynchronous
//! work already in flight; it only decides whether to start new work
//! and which child controllers should exist. Returned [`ChildSpec`]
//! lists are reconciled against the running children by id:
//! new ids are instantiated, orphaned ids are torn down.
//!
//! ## Boundaries
//!
//! Outbound effects are explicit: state mutations go through
//! [`Command`] batches dispatched to the [`StateStore`], results for
//! the presentation layer through [`Event`]s handed to a
//! [`Publisher`]. Controllers read store state only via
//! [`StateStore::snapshot`].

mod aggregation;
mod controller;
mod error;
mod publish;
mod query;
mod registry;
mod store;
mod trace;

pub use aggregation::{AggregationController, AggregationRegistry, AggregationSpec};
pub use controller::{ChildSpec, Controller, ControllerContext, ControllerTree};
pub use error::{ControllerError, LoadError, Result};
pub use publish::{Event, Publisher};
pub use query::QueryController;
pub use registry::{TrackArgs, TrackRegistry};
pub use store::{
    AggregatePreference, Command, QueryConfig, StateStore, StoreSnapshot, TrackState,
    VisibleWindow,
};
pub use trace::TraceController;
