//! Thread listing and timeline overview.
//!
//! The overview divides the trace into exactly 100 equal buckets. Each
//! bucket is queried for per-CPU busy time (excluding the idle
//! thread), normalized by the bucket width into a dimensionless load
//! fraction, and published immediately. A single combined query then
//! produces one load series per process.

use std::collections::BTreeMap;

use tracedeck_core::{QuantizedLoad, ThreadDesc, TimeSpan};
use tracedeck_engine::Engine;

use crate::error::LoadError;
use crate::publish::{Event, Publisher};
use crate::store::{Command, StateStore};

/// Number of overview buckets, independent of trace duration.
const NUM_BUCKETS: usize = 100;

/// Publish the thread/process join as an ordered thread list.
///
/// Rows are published in query-result order, not re-sorted.
pub(crate) async fn list_threads(
    engine: &dyn Engine,
    store: &dyn StateStore,
    publisher: &dyn Publisher,
) -> Result<(), LoadError> {
    store.dispatch(vec![Command::status("Reading thread list")]);
    let rows = engine
        .query(
            "select utid, tid, pid, thread.name, process.name \
             from thread inner join process using(upid)",
        )
        .await?;

    let mut threads = Vec::with_capacity(rows.num_records);
    for i in 0..rows.num_records {
        threads.push(ThreadDesc {
            utid: rows.longs(0)?[i],
            tid: rows.longs(1)?[i],
            pid: rows.longs(2)?[i],
            thread_name: rows.strings(3)?[i].clone(),
            proc_name: rows.strings(4)?[i].clone(),
        });
    }
    publisher.publish(Event::Threads(threads));
    Ok(())
}

/// Compute and publish the timeline overview.
pub(crate) async fn load_overview(
    engine: &dyn Engine,
    bounds: TimeSpan,
    store: &dyn StateStore,
    publisher: &dyn Publisher,
) -> Result<(), LoadError> {
    let buckets = bounds.buckets(NUM_BUCKETS);
    let step_sec = bounds.duration() / NUM_BUCKETS as f64;

    // Per-CPU scheduling load, one query and one publish per bucket.
    for (step, bucket) in buckets.iter().enumerate() {
        let percent = ((step + 1) as f64 / NUM_BUCKETS as f64 * 1000.0).round() / 10.0;
        store.dispatch(vec![Command::status(format!("Loading overview {percent}%"))]);

        let rows = engine
            .query(&format!(
                "select sum(dur)/{step_sec}/1e9, cpu from sched \
                 where ts >= {} and ts < {} and utid != 0 \
                 group by cpu order by cpu",
                bucket.start_ns(),
                bucket.end_ns()
            ))
            .await?;

        let mut loads: BTreeMap<String, Vec<QuantizedLoad>> = BTreeMap::new();
        for i in 0..rows.num_records {
            let load = rows.doubles(0)?[i];
            let cpu = rows.longs(1)?[i];
            loads.insert(
                cpu.to_string(),
                vec![QuantizedLoad {
                    start_sec: bucket.start_sec,
                    end_sec: bucket.end_sec,
                    load,
                }],
            );
        }
        publisher.publish(Event::Overview { loads });
    }

    // Per-process slice load: one combined query bucketing by time and
    // thread, joined to processes and aggregated per upid.
    let trace_start_ns = bounds.start_sec * 1e9;
    let step_ns = step_sec * 1e9;
    let rows = engine
        .query(&format!(
            "select bucket, upid, sum(utid_sum) / cast({step_ns} as float) as upid_sum \
             from thread inner join \
             (select cast((ts - {trace_start_ns})/{step_ns} as int) as bucket, \
             sum(dur) as utid_sum, utid from slices group by bucket, utid) \
             using(utid) group by bucket, upid"
        ))
        .await?;

    let mut loads: BTreeMap<String, Vec<QuantizedLoad>> = BTreeMap::new();
    for i in 0..rows.num_records {
        let bucket = rows.longs(0)?[i];
        let upid = rows.longs(1)?[i];
        let load = rows.doubles(2)?[i];

        let start_sec = bounds.start_sec + step_sec * bucket as f64;
        loads.entry(upid.to_string()).or_default().push(QuantizedLoad {
            start_sec,
            end_sec: start_sec + step_sec,
            load,
        });
    }
    publisher.publish(Event::Overview { loads });
    Ok(())
}
