//! Publish boundary toward the presentation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracedeck_core::{AggregateResult, QuantizedLoad, ThreadDesc};
use tracedeck_engine::QueryResult;

/// A result published to the presentation layer.
///
/// Consumers key these by kind/tab, never by request identity; a stale
/// in-flight fetch therefore cannot clobber anything it should not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Ordered thread list, in query-result order.
    Threads(Vec<ThreadDesc>),
    /// Overview samples keyed by CPU index or process id.
    Overview {
        /// Load series per key.
        loads: BTreeMap<String, Vec<QuantizedLoad>>,
    },
    /// One materialized aggregate table.
    Aggregate {
        /// The aggregation kind the table belongs to.
        kind: String,
        /// The table.
        data: AggregateResult,
    },
    /// Result of one ad-hoc query.
    Query {
        /// Query id from the store.
        id: String,
        /// The raw result.
        result: QueryResult,
    },
}

/// Sink for published events.
pub trait Publisher: Send + Sync {
    /// Hand one event to the presentation layer.
    fn publish(&self, event: Event);
}
