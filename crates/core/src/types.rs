//! Engine configuration and published descriptor types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the raw trace bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceSource {
    /// A local file, read in fixed-size chunks.
    File(PathBuf),
    /// A remote URL, fetched as a streamed response body.
    Url(String),
}

/// One opened trace as the state store sees it.
///
/// Owned by the store; the lifecycle controller reads it each tick and
/// flips `ready` via a dispatched command once ingestion and the
/// post-ingestion queries have finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Identifier tying tracks and controllers to this engine.
    pub id: String,
    /// Source of the trace bytes.
    pub source: TraceSource,
    /// Whether the engine has finished loading and can serve queries.
    pub ready: bool,
}

/// One thread row from the thread/process join, published in
/// query-result order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDesc {
    /// Unique thread id (trace-processor scoped).
    pub utid: i64,
    /// OS thread id.
    pub tid: i64,
    /// OS process id.
    pub pid: i64,
    /// Thread name.
    pub thread_name: String,
    /// Process name.
    pub proc_name: String,
}

/// One overview sample: the busy fraction of one CPU or process over
/// one time bucket. `load` is dimensionless (busy time normalized by
/// bucket width).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizedLoad {
    /// Bucket start, seconds.
    pub start_sec: f64,
    /// Bucket end, seconds.
    pub end_sec: f64,
    /// Busy fraction over the bucket.
    pub load: f64,
}
