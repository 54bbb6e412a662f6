//! Reconciliation primitive.
//!
//! Every controller is re-invoked on every state tick and may return a
//! list of child specs. The tree reconciles that list against the
//! children currently running: ids not seen before are instantiated
//! via the spec's factory, running ids keep their instance untouched,
//! and ids that disappeared are torn down (descendants first). The
//! whole pass is idempotent given identical input.

use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregation::AggregationRegistry;
use crate::error::{ControllerError, Result};
use crate::publish::Publisher;
use crate::registry::TrackRegistry;
use crate::store::StateStore;

/// Shared collaborators handed to every controller invocation.
#[derive(Clone)]
pub struct ControllerContext {
    /// The state store boundary.
    pub store: Arc<dyn StateStore>,
    /// The publish boundary.
    pub publisher: Arc<dyn Publisher>,
    /// Creates engines for opened traces.
    pub engines: Arc<dyn tracedeck_engine::EngineFactory>,
    /// Track controller factories, by track kind.
    pub tracks: Arc<TrackRegistry>,
    /// Aggregation capability sets, by kind.
    pub aggregations: Arc<AggregationRegistry>,
}

/// A controller participating in reconciliation.
pub trait Controller: Send {
    /// One cheap, non-blocking tick. Returns the desired child set, or
    /// `None` for no children.
    fn run(&mut self, cx: &ControllerContext) -> Result<Option<Vec<ChildSpec>>>;

    /// Called once when the controller is reconciled away.
    fn on_destroy(&mut self) {}
}

type Factory = Box<dyn FnOnce(&ControllerContext) -> Box<dyn Controller> + Send>;

/// Specification of one desired child controller.
pub struct ChildSpec {
    /// Identity of the child; reconciliation compares by id only.
    pub id: String,
    factory: Factory,
}

impl ChildSpec {
    /// A child named `id`, built by `factory` if it is not already
    /// running.
    pub fn new(
        id: impl Into<String>,
        factory: impl FnOnce(&ControllerContext) -> Box<dyn Controller> + Send + 'static,
    ) -> Self {
        ChildSpec {
            id: id.into(),
            factory: Box::new(factory),
        }
    }
}

impl std::fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildSpec").field("id", &self.id).finish()
    }
}

struct Node {
    controller: Box<dyn Controller>,
    children: Vec<String>,
}

/// The running controller tree.
///
/// Ids are unique across the whole tree (track ids, query ids and the
/// synthesized per-engine ids already are).
pub struct ControllerTree {
    nodes: HashMap<String, Node>,
    roots: Vec<String>,
}

impl ControllerTree {
    /// An empty tree.
    pub fn new() -> Self {
        ControllerTree {
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Install a root controller.
    pub fn add_root(&mut self, id: impl Into<String>, controller: Box<dyn Controller>) {
        let id = id.into();
        self.nodes.insert(
            id.clone(),
            Node {
                controller,
                children: Vec::new(),
            },
        );
        self.roots.push(id);
    }

    /// Run one reconciliation pass over the whole tree.
    pub fn tick(&mut self, cx: &ControllerContext) -> Result<()> {
        for id in self.roots.clone() {
            self.run_node(&id, cx)?;
        }
        Ok(())
    }

    /// Number of live controllers.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no controllers.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a controller with `id` is running.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn run_node(&mut self, id: &str, cx: &ControllerContext) -> Result<()> {
        let specs = {
            let node = self
                .nodes
                .get_mut(id)
                .ok_or_else(|| ControllerError::InvalidState(format!("no controller {id}")))?;
            node.controller.run(cx)?.unwrap_or_default()
        };

        // Tear down children whose id is no longer wanted.
        let previous = self.nodes[id].children.clone();
        for child in &previous {
            if !specs.iter().any(|s| &s.id == child) {
                tracing::debug!(parent = id, child = child.as_str(), "destroying controller");
                self.destroy_node(child);
            }
        }

        // Instantiate children seen for the first time.
        let mut children = Vec::with_capacity(specs.len());
        for spec in specs {
            if !self.nodes.contains_key(&spec.id) {
                tracing::debug!(parent = id, child = spec.id.as_str(), "creating controller");
                let controller = (spec.factory)(cx);
                self.nodes.insert(
                    spec.id.clone(),
                    Node {
                        controller,
                        children: Vec::new(),
                    },
                );
            }
            children.push(spec.id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = children.clone();
        }

        for child in children {
            self.run_node(&child, cx)?;
        }
        Ok(())
    }

    fn destroy_node(&mut self, id: &str) {
        if let Some(mut node) = self.nodes.remove(id) {
            for child in std::mem::take(&mut node.children) {
                self.destroy_node(&child);
            }
            node.controller.on_destroy();
        }
    }
}

impl Default for ControllerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ControllerTree {
    fn drop(&mut self) {
        for id in self.roots.clone() {
            self.destroy_node(&id);
        }
    }
}
