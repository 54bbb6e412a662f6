//! Trace ingestion and the post-ingestion chain.
//!
//! Streams raw bytes into the engine (local file or remote URL),
//! signals end-of-stream, records the trace time bounds, derives the
//! default track layout when none exists, then lists threads and
//! computes the overview. Any transport, io or query error aborts the
//! whole chain: the error is logged, surfaced as a status line, and
//! the engine stays not-ready.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::io::AsyncReadExt;
use tracedeck_core::TraceSource;
use tracedeck_engine::Engine;

use crate::error::LoadError;
use crate::publish::Publisher;
use crate::store::{Command, StateStore};
use crate::trace::{overview, tracks};

/// Fixed chunk size for local file ingestion.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Minimum wall time between throughput status updates for remote
/// sources.
const STATUS_INTERVAL: Duration = Duration::from_millis(100);

const STATUS_HEADER: &str = "Opening trace";

/// Spawn the asynchronous load task for one trace.
///
/// On success the engine is marked ready in the store; on failure the
/// trace load is failed permanently (no retry).
pub(crate) fn spawn_load(
    engine: Arc<dyn Engine>,
    engine_id: String,
    source: TraceSource,
    store: Arc<dyn StateStore>,
    publisher: Arc<dyn Publisher>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match load_trace(&*engine, &engine_id, &source, &*store, &*publisher).await {
            Ok(()) => {
                tracing::info!(engine = engine_id.as_str(), "trace loaded");
                store.dispatch(vec![Command::SetEngineReady {
                    engine_id,
                    ready: true,
                }]);
            }
            Err(err) => {
                tracing::error!(engine = engine_id.as_str(), error = %err, "trace load failed");
                store.dispatch(vec![Command::status(format!("{err}"))]);
            }
        }
    })
}

async fn load_trace(
    engine: &dyn Engine,
    engine_id: &str,
    source: &TraceSource,
    store: &dyn StateStore,
    publisher: &dyn Publisher,
) -> Result<(), LoadError> {
    match source {
        TraceSource::File(path) => ingest_file(engine, path, store).await?,
        TraceSource::Url(url) => ingest_url(engine, url, store).await?,
    }
    engine.notify_eof().await?;

    let bounds = engine.trace_time_bounds().await?;
    let mut commands = vec![
        Command::SetTraceTime(bounds),
        Command::Navigate {
            route: "/viewer".into(),
        },
    ];
    // Widen the visible window to the full trace only if no window was
    // ever set.
    if store.snapshot().visible_trace_time.last_update == 0.0 {
        commands.push(Command::SetVisibleTraceTime(bounds));
    }
    store.dispatch(commands);

    // A reload that already carries shared track configuration keeps
    // it; only a blank store gets the derived default layout.
    let snapshot = store.snapshot();
    if snapshot.pinned_tracks.is_empty() && snapshot.scrolling_tracks.is_empty() {
        tracks::derive_tracks(engine, engine_id, store).await?;
    }

    overview::list_threads(engine, store, publisher).await?;
    overview::load_overview(engine, bounds, store, publisher).await?;
    Ok(())
}

/// Ingest a local file in fixed 1 MiB chunks, reporting percentage
/// progress after each chunk.
async fn ingest_file(
    engine: &dyn Engine,
    path: &Path,
    store: &dyn StateStore,
) -> Result<(), LoadError> {
    let mut file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await?.len();

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes_read = 0u64;
    loop {
        let mut filled = 0;
        while filled < buf.len() {
            let n = file.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            break;
        }
        engine
            .ingest_chunk(&buf[..filled])
            .await
            .map_err(LoadError::Engine)?;
        bytes_read += filled as u64;
        let progress = (bytes_read as f64 / total as f64 * 100.0).round() as u32;
        store.dispatch(vec![Command::status(format!(
            "{STATUS_HEADER} {progress} %"
        ))]);
        if filled < buf.len() {
            break;
        }
    }
    Ok(())
}

/// Ingest a streamed remote fetch. The total size is unknown, so
/// progress is reported as cumulative megabytes and throughput, at
/// most once per 100 ms of wall time.
async fn ingest_url(
    engine: &dyn Engine,
    url: &str,
    store: &dyn StateStore,
) -> Result<(), LoadError> {
    let response = reqwest::get(url).await?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(LoadError::Http(response.status().as_u16()));
    }

    let started = Instant::now();
    let mut last_status: Option<Instant> = None;
    let mut bytes_read = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        bytes_read += chunk.len() as u64;
        engine
            .ingest_chunk(&chunk)
            .await
            .map_err(LoadError::Engine)?;

        if last_status.map_or(true, |t| t.elapsed() >= STATUS_INTERVAL) {
            last_status = Some(Instant::now());
            let mb = bytes_read as f64 / 1e6;
            let elapsed = started.elapsed().as_secs_f64().max(1e-3);
            store.dispatch(vec![Command::status(format!(
                "{STATUS_HEADER} {mb:.1} MB ({:.1} MB/s)",
                mb / elapsed
            ))]);
        }
    }
    Ok(())
}
