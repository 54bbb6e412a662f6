//! Session wiring: collaborators plus the running controller tree.

use std::sync::Arc;

use tracedeck_controller::{
    AggregationRegistry, ChildSpec, Controller, ControllerContext, ControllerTree, Publisher,
    StateStore, TraceController, TrackRegistry,
};
use tracedeck_engine::EngineFactory;

use crate::error::Result;

/// A running control-layer session.
///
/// Owns the controller tree and the shared collaborators. The host
/// calls [`Session::tick`] after every store change; ticks are cheap,
/// non-blocking polls that never interrupt in-flight asynchronous
/// work.
pub struct Session {
    cx: ControllerContext,
    tree: ControllerTree,
}

impl Session {
    /// Wire a session from the host-supplied collaborators.
    pub fn new(
        store: Arc<dyn StateStore>,
        publisher: Arc<dyn Publisher>,
        engines: Arc<dyn EngineFactory>,
        tracks: Arc<TrackRegistry>,
        aggregations: Arc<AggregationRegistry>,
    ) -> Self {
        let cx = ControllerContext {
            store,
            publisher,
            engines,
            tracks,
            aggregations,
        };
        let mut tree = ControllerTree::new();
        tree.add_root("traces", Box::new(TraceListController));
        Session { cx, tree }
    }

    /// Run one reconciliation pass over the controller tree.
    ///
    /// Must be called from within a tokio runtime; controllers spawn
    /// their asynchronous work onto it.
    pub fn tick(&mut self) -> Result<()> {
        self.tree.tick(&self.cx)?;
        Ok(())
    }

    /// The shared collaborators.
    pub fn context(&self) -> &ControllerContext {
        &self.cx
    }

    /// Number of live controllers, including the root.
    pub fn controller_count(&self) -> usize {
        self.tree.len()
    }
}

/// Top-level controller: one trace lifecycle controller per engine
/// config present in the store.
struct TraceListController;

impl Controller for TraceListController {
    fn run(
        &mut self,
        cx: &ControllerContext,
    ) -> tracedeck_controller::Result<Option<Vec<ChildSpec>>> {
        let snapshot = cx.store.snapshot();
        let children = snapshot
            .engines
            .keys()
            .map(|engine_id| {
                let id = engine_id.clone();
                ChildSpec::new(format!("trace-{engine_id}"), move |_cx| {
                    Box::new(TraceController::new(id)) as Box<dyn Controller>
                })
            })
            .collect();
        Ok(Some(children))
    }
}
