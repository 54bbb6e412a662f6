//! Track and track-group descriptors.
//!
//! Tracks are the rows of the timeline; groups are collapsible
//! containers of rows. Both are derived by the lifecycle controller
//! after ingestion and dispatched to the store as commands. A group
//! must reach the store before any track that references it.

use serde::{Deserialize, Serialize};

/// Identifier of a track in the store's track map.
pub type TrackId = String;

/// Track kind for per-CPU scheduling slices.
pub const CPU_SLICE_TRACK_KIND: &str = "CpuSliceTrack";
/// Track kind for per-thread nested slices.
pub const SLICE_TRACK_KIND: &str = "ChromeSliceTrack";
/// Track kind for the per-process summary row.
pub const PROCESS_SUMMARY_TRACK_KIND: &str = "ProcessSummaryTrack";
/// Track kind for well-known vsync counters.
pub const VSYNC_TRACK_KIND: &str = "VsyncTrack";

/// The implicit top-level group holding ungrouped scrolling tracks.
pub const SCROLLING_TRACK_GROUP: &str = "ScrollingTracks";

/// Kind-specific track configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackConfig {
    /// A named counter track.
    Counter {
        /// Counter name as it appears in the counters table.
        counter_name: String,
    },
    /// Scheduling slices for one logical CPU.
    CpuSlices {
        /// Logical CPU index.
        cpu: u32,
    },
    /// Nested slices for one thread.
    Slices {
        /// Unique process id.
        upid: i64,
        /// Unique thread id.
        utid: i64,
        /// Maximum slice nesting depth for the thread.
        max_depth: i64,
    },
    /// Activity summary for one process.
    ProcessSummary {
        /// Unique process id.
        upid: i64,
        /// OS process id.
        pid: i64,
        /// Representative thread id.
        utid: i64,
        /// Maximum slice nesting depth of the representative thread.
        max_depth: i64,
    },
}

/// One track to add to the store.
///
/// `id` is `None` for tracks whose id the store assigns; summary
/// tracks carry an explicit id because their group references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Explicit track id, if the group layout needs to reference it.
    pub id: Option<TrackId>,
    /// Owning engine.
    pub engine_id: String,
    /// Track kind, matched against the track controller registry.
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Containing group, if any.
    pub track_group: Option<String>,
    /// Kind-specific configuration.
    pub config: TrackConfig,
}

/// One collapsed track group to add to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackGroupDescriptor {
    /// Group id, referenced by member tracks.
    pub id: String,
    /// Owning engine.
    pub engine_id: String,
    /// The summary track shown while the group is collapsed.
    pub summary_track_id: TrackId,
    /// Display name.
    pub name: String,
    /// Whether the group starts collapsed.
    pub collapsed: bool,
}
