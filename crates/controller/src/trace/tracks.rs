//! Default track derivation.
//!
//! Runs once per fresh trace load, after end-of-stream. Produces one
//! batched command dispatch with a strict internal order: process
//! summary tracks first, then their groups, then every leaf track —
//! a group must exist in the store before any track references it.

use std::collections::HashMap;

use tracedeck_core::{
    TrackConfig, TrackDescriptor, TrackGroupDescriptor, CPU_SLICE_TRACK_KIND,
    PROCESS_SUMMARY_TRACK_KIND, SCROLLING_TRACK_GROUP, SLICE_TRACK_KIND, VSYNC_TRACK_KIND,
};
use tracedeck_engine::Engine;
use uuid::Uuid;

use crate::error::LoadError;
use crate::store::{Command, StateStore};

/// Counters probed for dedicated tracks. A missing counter is
/// expected, not an error.
const WELL_KNOWN_COUNTERS: [&str; 2] = ["VSYNC-sf", "VSYNC-app"];

pub(crate) async fn derive_tracks(
    engine: &dyn Engine,
    engine_id: &str,
    store: &dyn StateStore,
) -> Result<(), LoadError> {
    store.dispatch(vec![Command::status("Loading tracks")]);
    let engine_id = engine_id.to_owned();

    let mut track_commands = Vec::new();

    for counter in WELL_KNOWN_COUNTERS {
        let probe = engine
            .query(&format!(
                "select ts from counters where name like \"{counter}\" limit 1"
            ))
            .await?;
        if probe.num_records == 0 {
            continue;
        }
        track_commands.push(Command::AddTrack(TrackDescriptor {
            id: None,
            engine_id: engine_id.clone(),
            kind: VSYNC_TRACK_KIND.into(),
            name: counter.into(),
            track_group: None,
            config: TrackConfig::Counter {
                counter_name: counter.into(),
            },
        }));
    }

    let num_cpus = engine.num_cpus().await?;
    for cpu in 0..num_cpus {
        track_commands.push(Command::AddTrack(TrackDescriptor {
            id: None,
            engine_id: engine_id.clone(),
            kind: CPU_SLICE_TRACK_KIND.into(),
            name: format!("Cpu {cpu}"),
            track_group: Some(SCROLLING_TRACK_GROUP.into()),
            config: TrackConfig::CpuSlices { cpu },
        }));
    }

    // Fetching max depth separately is considerably faster than
    // joining it into the thread/process query.
    let depth_rows = engine
        .query("select utid, max(depth) from slices group by utid")
        .await?;
    let mut utid_to_max_depth = HashMap::new();
    if depth_rows.num_records > 0 {
        let utids = depth_rows.longs(0)?;
        let depths = depth_rows.longs(1)?;
        for i in 0..depth_rows.num_records {
            utid_to_max_depth.insert(utids[i], depths[i]);
        }
    }

    let thread_rows = engine
        .query(
            "select utid, tid, upid, pid, thread.name, process.name \
             from thread inner join process using(upid)",
        )
        .await?;

    let mut upid_to_group: HashMap<i64, String> = HashMap::new();
    let mut summary_commands = Vec::new();
    let mut group_commands = Vec::new();
    for i in 0..thread_rows.num_records {
        let utid = thread_rows.longs(0)?[i];
        // A thread without stackable slices gets no track.
        let Some(&max_depth) = utid_to_max_depth.get(&utid) else {
            continue;
        };

        let tid = thread_rows.longs(1)?[i];
        let upid = thread_rows.longs(2)?[i];
        let pid = thread_rows.longs(3)?[i];
        let thread_name = &thread_rows.strings(4)?[i];
        let process_name = &thread_rows.strings(5)?[i];

        let group_id = match upid_to_group.get(&upid) {
            Some(id) => id.clone(),
            None => {
                // First thread of this process: create the summary
                // track and its collapsed group exactly once.
                let group_id = Uuid::new_v4().to_string();
                let summary_track_id = Uuid::new_v4().to_string();
                upid_to_group.insert(upid, group_id.clone());
                summary_commands.push(Command::AddTrack(TrackDescriptor {
                    id: Some(summary_track_id.clone()),
                    engine_id: engine_id.clone(),
                    kind: PROCESS_SUMMARY_TRACK_KIND.into(),
                    name: format!("{pid} summary"),
                    track_group: None,
                    config: TrackConfig::ProcessSummary {
                        upid,
                        pid,
                        utid,
                        max_depth,
                    },
                }));
                group_commands.push(Command::AddTrackGroup(TrackGroupDescriptor {
                    id: group_id.clone(),
                    engine_id: engine_id.clone(),
                    summary_track_id,
                    name: format!("{process_name} {pid}"),
                    collapsed: true,
                }));
                group_id
            }
        };

        track_commands.push(Command::AddTrack(TrackDescriptor {
            id: None,
            engine_id: engine_id.clone(),
            kind: SLICE_TRACK_KIND.into(),
            name: format!("{thread_name}[{tid}]"),
            track_group: Some(group_id),
            config: TrackConfig::Slices {
                upid,
                utid,
                max_depth,
            },
        }));
    }

    // Summary tracks, then groups, then every leaf: one atomic batch.
    let mut commands = summary_commands;
    commands.extend(group_commands);
    commands.extend(track_commands);
    store.dispatch(commands);
    Ok(())
}
