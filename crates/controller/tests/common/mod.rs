//! Shared test doubles: a scripted engine, a recording store, and a
//! recording publisher.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracedeck_controller::{
    Command, ControllerContext, Event, Publisher, StateStore, StoreSnapshot,
};
use tracedeck_core::{EngineConfig, TimeSpan};
use tracedeck_engine::{
    ColumnValues, Engine, EngineError, EngineFactory, QueryColumn, QueryResult, QueryValue,
};

/// Scripted engine. Queries are answered by the first response whose
/// pattern is a substring of the SQL; unmatched queries return an
/// empty result.
pub struct FakeEngine {
    pub queries: Mutex<Vec<String>>,
    pub ingest_chunks: Mutex<Vec<usize>>,
    pub eof_calls: AtomicUsize,
    responses: Mutex<Vec<(String, QueryResult)>>,
    one_row_responses: Mutex<Vec<(String, Vec<QueryValue>)>>,
    bounds: TimeSpan,
    cpus: u32,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        FakeEngine {
            queries: Mutex::new(Vec::new()),
            ingest_chunks: Mutex::new(Vec::new()),
            eof_calls: AtomicUsize::new(0),
            responses: Mutex::new(Vec::new()),
            one_row_responses: Mutex::new(Vec::new()),
            bounds: TimeSpan::new(0.0, 10.0),
            cpus: 0,
            gate: Mutex::new(None),
        }
    }

    pub fn with_bounds(mut self, bounds: TimeSpan) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_cpus(mut self, cpus: u32) -> Self {
        self.cpus = cpus;
        self
    }

    /// Answer queries containing `pattern` with `result`.
    pub fn respond(&self, pattern: &str, result: QueryResult) {
        self.responses.lock().push((pattern.into(), result));
    }

    /// Answer one-row queries containing `pattern` with `row`.
    pub fn respond_one_row(&self, pattern: &str, row: Vec<QueryValue>) {
        self.one_row_responses.lock().push((pattern.into(), row));
    }

    /// Block every subsequent `query` call until permits are added.
    pub fn hold_queries(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn queries_matching(&self, pattern: &str) -> usize {
        self.queries
            .lock()
            .iter()
            .filter(|q| q.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn ingest_chunk(&self, data: &[u8]) -> Result<(), EngineError> {
        self.ingest_chunks.lock().push(data.len());
        Ok(())
    }

    async fn notify_eof(&self) -> Result<(), EngineError> {
        self.eof_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult, EngineError> {
        self.queries.lock().push(sql.to_owned());
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.map_err(|_| EngineError::Ingest("gate closed".into()))?;
            permit.forget();
        }
        let responses = self.responses.lock();
        let result = responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(QueryResult::empty);
        Ok(result)
    }

    async fn query_one_row(&self, sql: &str) -> Result<Vec<QueryValue>, EngineError> {
        self.queries.lock().push(sql.to_owned());
        let responses = self.one_row_responses.lock();
        let row = responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, row)| row.clone())
            .unwrap_or_else(|| vec![QueryValue::Null]);
        Ok(row)
    }

    async fn trace_time_bounds(&self) -> Result<TimeSpan, EngineError> {
        Ok(self.bounds)
    }

    async fn num_cpus(&self) -> Result<u32, EngineError> {
        Ok(self.cpus)
    }
}

/// Engine factory handing out one shared fake.
pub struct FakeEngineFactory {
    pub engine: Arc<FakeEngine>,
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, _config: &EngineConfig) -> Result<Arc<dyn Engine>, EngineError> {
        Ok(Arc::clone(&self.engine) as Arc<dyn Engine>)
    }
}

/// Recording store: keeps every dispatched batch and applies
/// `SetEngineReady` so lifecycle transitions are observable.
#[derive(Default)]
pub struct FakeStore {
    pub snapshot: Mutex<StoreSnapshot>,
    pub batches: Mutex<Vec<Vec<Command>>>,
}

impl FakeStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        FakeStore {
            snapshot: Mutex::new(snapshot),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// All dispatched commands, flattened.
    pub fn commands(&self) -> Vec<Command> {
        self.batches.lock().iter().flatten().cloned().collect()
    }

    /// All status lines, in dispatch order.
    pub fn statuses(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::UpdateStatus { msg, .. } => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn engine_ready(&self, engine_id: &str) -> bool {
        self.snapshot
            .lock()
            .engines
            .get(engine_id)
            .map(|e| e.ready)
            .unwrap_or(false)
    }
}

impl StateStore for FakeStore {
    fn dispatch(&self, commands: Vec<Command>) {
        let mut snapshot = self.snapshot.lock();
        for command in &commands {
            if let Command::SetEngineReady { engine_id, ready } = command {
                if let Some(config) = snapshot.engines.get_mut(engine_id) {
                    config.ready = *ready;
                }
            }
        }
        drop(snapshot);
        self.batches.lock().push(commands);
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.lock().clone()
    }
}

/// Recording publisher.
#[derive(Default)]
pub struct FakePublisher {
    pub events: Mutex<Vec<Event>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl Publisher for FakePublisher {
    fn publish(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Context wired from fakes. Also installs the test log subscriber.
pub fn context(
    store: &Arc<FakeStore>,
    publisher: &Arc<FakePublisher>,
    engine: &Arc<FakeEngine>,
) -> ControllerContext {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    ControllerContext {
        store: Arc::clone(store) as _,
        publisher: Arc::clone(publisher) as _,
        engines: Arc::new(FakeEngineFactory {
            engine: Arc::clone(engine),
        }),
        tracks: Arc::new(tracedeck_controller::TrackRegistry::new()),
        aggregations: Arc::new(tracedeck_controller::AggregationRegistry::new()),
    }
}

/// Poll until `cond` holds or the timeout elapses.
pub async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("condition not reached within timeout");
}

/// Convenience: a long-typed result column.
pub fn longs(name: &str, values: Vec<i64>) -> QueryColumn {
    QueryColumn {
        name: name.into(),
        values: ColumnValues::Longs(values),
    }
}

/// Convenience: a double-typed result column.
pub fn doubles(name: &str, values: Vec<f64>) -> QueryColumn {
    QueryColumn {
        name: name.into(),
        values: ColumnValues::Doubles(values),
    }
}

/// Convenience: a string-typed result column.
pub fn strings(name: &str, values: Vec<&str>) -> QueryColumn {
    QueryColumn {
        name: name.into(),
        values: ColumnValues::Strings(values.into_iter().map(String::from).collect()),
    }
}

/// Convenience: a result from columns, inferring the row count.
pub fn result(columns: Vec<QueryColumn>) -> QueryResult {
    let num_records = columns.first().map(|c| c.values.len()).unwrap_or(0);
    QueryResult {
        columns,
        num_records,
    }
}
