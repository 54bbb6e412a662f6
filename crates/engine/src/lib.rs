//! Query engine boundary.
//!
//! The engine is an external collaborator: it ingests raw trace bytes
//! and answers SQL-like queries. This crate only defines the boundary —
//! the [`Engine`] trait and the query result model. SQL execution
//! itself lives behind the trait.
//!
//! All operations are asynchronous; chunk ingestion and query
//! round-trips are the suspension points of the control layer.

mod error;
mod result;

pub use error::{EngineError, Result};
pub use result::{ColumnValues, QueryColumn, QueryResult, QueryValue};

use std::sync::Arc;

use async_trait::async_trait;
use tracedeck_core::{EngineConfig, TimeSpan};

/// The query/ingestion boundary for one trace.
///
/// One engine instance is exclusively owned by the lifecycle controller
/// of its trace and read-shared with that controller's children.
/// Queries are independent side-effect-free reads; view construction
/// issued through [`Engine::query`] is serialized by the callers.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Feed one chunk of raw trace bytes.
    async fn ingest_chunk(&self, data: &[u8]) -> Result<()>;

    /// Signal that the byte stream is exhausted. Must be called before
    /// any derivation query.
    async fn notify_eof(&self) -> Result<()>;

    /// Run a query, returning all rows.
    async fn query(&self, sql: &str) -> Result<QueryResult>;

    /// Run a query expected to produce a single row.
    async fn query_one_row(&self, sql: &str) -> Result<Vec<QueryValue>>;

    /// The trace's time bounds.
    async fn trace_time_bounds(&self) -> Result<TimeSpan>;

    /// Number of logical CPUs observed in the trace.
    async fn num_cpus(&self) -> Result<u32>;
}

/// Creates engine instances for opened traces.
///
/// Supplied by the host; the lifecycle controller calls it once per
/// trace when entering its initial state.
pub trait EngineFactory: Send + Sync {
    /// Create the engine for `config`.
    fn create(&self, config: &EngineConfig) -> Result<Arc<dyn Engine>>;
}
