//! State store boundary.
//!
//! The store itself is external; controllers interact with it through
//! exactly two operations: a one-way [`Command`] batch dispatch and a
//! cheap [`StoreSnapshot`] read. Snapshots are taken once per tick (or
//! at well-defined points inside an async chain) — controllers never
//! hold references into live store state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracedeck_core::{
    Area, AreaId, EngineConfig, Selection, Sorting, TimeSpan, TrackDescriptor,
    TrackGroupDescriptor, TrackId,
};

/// A state mutation dispatched to the store.
///
/// Dispatch is one-way and batched: a `Vec<Command>` handed to
/// [`StateStore::dispatch`] is applied atomically, in order. Ordering
/// inside a batch is meaningful — a group-creation command must
/// precede the commands of tracks referencing the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Flip the ready flag of an engine config.
    SetEngineReady {
        /// Engine to update.
        engine_id: String,
        /// New readiness.
        ready: bool,
    },
    /// Record the trace's total time bounds.
    SetTraceTime(TimeSpan),
    /// Route the UI somewhere (e.g. the viewer page once a trace
    /// finished loading).
    Navigate {
        /// Target route.
        route: String,
    },
    /// Set the visible time window.
    SetVisibleTraceTime(TimeSpan),
    /// Replace the status line.
    UpdateStatus {
        /// Status text.
        msg: String,
        /// Seconds since the Unix epoch.
        timestamp: f64,
    },
    /// Add one track.
    AddTrack(TrackDescriptor),
    /// Add one collapsed track group.
    AddTrackGroup(TrackGroupDescriptor),
}

impl Command {
    /// A status update stamped with the current wall time.
    pub fn status(msg: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Command::UpdateStatus {
            msg: msg.into(),
            timestamp,
        }
    }
}

/// One track as observed from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    /// Owning engine.
    pub engine_id: String,
    /// Track kind, looked up in the track controller registry.
    pub kind: String,
}

/// One pending ad-hoc query as observed from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// The statement to run.
    pub sql: String,
}

/// Per-kind aggregation preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatePreference {
    /// Preferred sort order, if the user picked one.
    pub sorting: Option<Sorting>,
}

/// The visible time window, with its last-update stamp.
///
/// `last_update == 0.0` means no window was ever set; the lifecycle
/// controller then widens the window to the full trace bounds after
/// ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleWindow {
    /// The window itself.
    pub time: TimeSpan,
    /// Seconds since the Unix epoch of the last change, 0 if never.
    pub last_update: f64,
}

impl Default for VisibleWindow {
    fn default() -> Self {
        VisibleWindow {
            time: TimeSpan::new(0.0, 0.0),
            last_update: 0.0,
        }
    }
}

/// The store fields the controllers observe, as one coherent snapshot.
///
/// Areas are held behind `Arc` on purpose: the store replaces the Arc
/// when a selection changes, and the aggregation controllers detect
/// that replacement by pointer identity.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Opened traces, by engine id.
    pub engines: BTreeMap<String, EngineConfig>,
    /// All tracks, by track id.
    pub tracks: BTreeMap<TrackId, TrackState>,
    /// Pending ad-hoc queries, by query id.
    pub queries: BTreeMap<String, QueryConfig>,
    /// The current selection, if any.
    pub current_selection: Option<Selection>,
    /// Area snapshots, by area id.
    pub areas: BTreeMap<AreaId, Arc<Area>>,
    /// Per-kind aggregation preferences.
    pub aggregate_preferences: BTreeMap<String, AggregatePreference>,
    /// Pinned track ids.
    pub pinned_tracks: Vec<TrackId>,
    /// Scrolling track ids.
    pub scrolling_tracks: Vec<TrackId>,
    /// Visible time window.
    pub visible_trace_time: VisibleWindow,
}

/// The state store as seen from the controllers.
pub trait StateStore: Send + Sync {
    /// Apply a batch of commands atomically, in order.
    fn dispatch(&self, commands: Vec<Command>);

    /// A coherent snapshot of the observed fields.
    fn snapshot(&self) -> StoreSnapshot;
}
