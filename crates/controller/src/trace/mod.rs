//! Per-trace lifecycle controller.
//!
//! One instance per opened trace. Owns the engine handle, drives
//! ingestion and the post-ingestion derivation chain, and once ready
//! reconciles one child controller per matching track, one per pending
//! ad-hoc query, and one aggregation controller per registered kind.

mod load;
mod overview;
mod tracks;

use std::sync::Arc;

use tracedeck_engine::Engine;

use crate::aggregation::AggregationController;
use crate::controller::{ChildSpec, Controller, ControllerContext};
use crate::error::{ControllerError, Result};
use crate::query::QueryController;
use crate::registry::TrackArgs;
use crate::store::Command;

/// Lifecycle states of one trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// Nothing started yet.
    Init,
    /// Ingestion and derivation are running; waiting for the store to
    /// reflect `ready = true`.
    LoadingTrace,
    /// Steady state: serving queries and reconciling children.
    Ready,
}

/// Drives one trace from raw bytes to a ready, queryable engine.
pub struct TraceController {
    engine_id: String,
    state: LoadState,
    engine: Option<Arc<dyn Engine>>,
}

impl TraceController {
    /// A controller for the engine config named `engine_id`.
    pub fn new(engine_id: impl Into<String>) -> Self {
        TraceController {
            engine_id: engine_id.into(),
            state: LoadState::Init,
            engine: None,
        }
    }

    fn child_specs(&self, cx: &ControllerContext) -> Result<Vec<ChildSpec>> {
        let engine = self
            .engine
            .clone()
            .ok_or_else(|| ControllerError::InvalidState("ready without an engine".into()))?;
        let snapshot = cx.store.snapshot();
        let mut children = Vec::new();

        // One child per track owned by this engine whose kind has a
        // registered factory.
        for (track_id, track) in &snapshot.tracks {
            if track.engine_id != self.engine_id {
                continue;
            }
            let Some(factory) = cx.tracks.get(&track.kind) else {
                continue;
            };
            let args_id = track_id.clone();
            let args_engine = Arc::clone(&engine);
            children.push(ChildSpec::new(track_id.clone(), move |cx| {
                factory(
                    TrackArgs {
                        track_id: args_id,
                        engine: args_engine,
                    },
                    cx,
                )
            }));
        }

        // One child per pending ad-hoc query.
        for (query_id, query) in &snapshot.queries {
            let id = query_id.clone();
            let sql = query.sql.clone();
            let query_engine = Arc::clone(&engine);
            children.push(ChildSpec::new(query_id.clone(), move |_cx| {
                Box::new(QueryController::new(id, sql, query_engine))
            }));
        }

        // One aggregation controller per registered kind, read-sharing
        // this trace's engine.
        for (kind, spec) in cx.aggregations.kinds() {
            let id = format!("aggregation-{}-{}", kind, self.engine_id);
            let agg_engine = Arc::clone(&engine);
            children.push(ChildSpec::new(id, move |cx| {
                Box::new(AggregationController::new(kind, spec, agg_engine, cx))
            }));
        }

        Ok(children)
    }
}

impl Controller for TraceController {
    fn run(&mut self, cx: &ControllerContext) -> Result<Option<Vec<ChildSpec>>> {
        let snapshot = cx.store.snapshot();
        let config = snapshot.engines.get(&self.engine_id).ok_or_else(|| {
            ControllerError::InvalidState(format!("no engine config {}", self.engine_id))
        })?;

        match self.state {
            LoadState::Init => {
                cx.store.dispatch(vec![Command::SetEngineReady {
                    engine_id: self.engine_id.clone(),
                    ready: false,
                }]);
                let engine = cx.engines.create(config)?;
                self.engine = Some(Arc::clone(&engine));
                load::spawn_load(
                    engine,
                    self.engine_id.clone(),
                    config.source.clone(),
                    Arc::clone(&cx.store),
                    Arc::clone(&cx.publisher),
                );
                cx.store.dispatch(vec![Command::status("Opening trace")]);
                tracing::debug!(engine = self.engine_id.as_str(), "trace load started");
                self.state = LoadState::LoadingTrace;
                Ok(None)
            }

            LoadState::LoadingTrace => {
                // Stay here until the load task finished and the store
                // reflects readiness.
                if self.engine.is_none() || !config.ready {
                    return Ok(None);
                }
                tracing::debug!(engine = self.engine_id.as_str(), "trace ready");
                self.state = LoadState::Ready;
                Ok(None)
            }

            LoadState::Ready => {
                if !config.ready {
                    return Err(ControllerError::InvalidState(
                        "engine lost readiness after reaching ready state".into(),
                    ));
                }
                Ok(Some(self.child_specs(cx)?))
            }
        }
    }

    fn on_destroy(&mut self) {
        // Dropping the handle releases the engine once the last child
        // reference goes away.
        self.engine = None;
    }
}
