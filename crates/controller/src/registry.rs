//! Track controller registry.
//!
//! Track rendering lives outside this crate; hosts register one
//! factory per track kind and the lifecycle controller spawns a child
//! for every track whose kind has a factory. Tracks with unregistered
//! kinds are skipped, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracedeck_core::TrackId;
use tracedeck_engine::Engine;

use crate::controller::{Controller, ControllerContext};

/// Arguments handed to a track controller factory.
pub struct TrackArgs {
    /// The track this controller serves.
    pub track_id: TrackId,
    /// Read-shared engine handle of the owning trace.
    pub engine: Arc<dyn Engine>,
}

type TrackFactory =
    Arc<dyn Fn(TrackArgs, &ControllerContext) -> Box<dyn Controller> + Send + Sync>;

/// Registry of track controller factories, keyed by track kind.
#[derive(Default)]
pub struct TrackRegistry {
    factories: RwLock<HashMap<String, TrackFactory>>,
}

impl TrackRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for `kind`, replacing any previous one.
    pub fn register(
        &self,
        kind: impl Into<String>,
        factory: impl Fn(TrackArgs, &ControllerContext) -> Box<dyn Controller> + Send + Sync + 'static,
    ) {
        self.factories.write().insert(kind.into(), Arc::new(factory));
    }

    /// Whether `kind` has a registered factory.
    pub fn has(&self, kind: &str) -> bool {
        self.factories.read().contains_key(kind)
    }

    /// The factory for `kind`, if registered.
    pub fn get(&self, kind: &str) -> Option<TrackFactory> {
        self.factories.read().get(kind).cloned()
    }
}
