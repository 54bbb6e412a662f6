//! Ad-hoc query child controller.
//!
//! One instance per pending query in the store. The first tick spawns
//! the query; the result is published keyed by the query id. The
//! parent reconciles the child away once the query is removed from
//! the store.

use std::sync::Arc;

use tracedeck_engine::Engine;

use crate::controller::{ChildSpec, Controller, ControllerContext};
use crate::error::Result;
use crate::publish::Event;

/// Runs one ad-hoc query and publishes its result.
pub struct QueryController {
    id: String,
    sql: String,
    engine: Arc<dyn Engine>,
    started: bool,
}

impl QueryController {
    /// A controller for query `id` with statement `sql`.
    pub fn new(id: impl Into<String>, sql: impl Into<String>, engine: Arc<dyn Engine>) -> Self {
        QueryController {
            id: id.into(),
            sql: sql.into(),
            engine,
            started: false,
        }
    }
}

impl Controller for QueryController {
    fn run(&mut self, cx: &ControllerContext) -> Result<Option<Vec<ChildSpec>>> {
        if self.started {
            return Ok(None);
        }
        self.started = true;

        let id = self.id.clone();
        let sql = self.sql.clone();
        let engine = Arc::clone(&self.engine);
        let publisher = Arc::clone(&cx.publisher);
        tokio::spawn(async move {
            match engine.query(&sql).await {
                Ok(result) => publisher.publish(Event::Query { id, result }),
                Err(err) => {
                    tracing::error!(query = id.as_str(), error = %err, "ad-hoc query failed");
                }
            }
        });
        Ok(None)
    }
}
