//! Aggregation controller behavior: empty publishes, change
//! detection, coalescing, materialization and sums.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use tracedeck_controller::{
    AggregatePreference, AggregationController, AggregationSpec, Controller, Event, StoreSnapshot,
};
use tracedeck_core::{
    AggregateExtra, AggregateResult, Area, ColumnData, ColumnDef, ColumnKind, Selection,
    SortDirection, Sorting, TimeSpan,
};
use tracedeck_engine::{Engine, QueryValue};

const KIND: &str = "cpu_by_thread";

struct TestSpec {
    has_rows: bool,
    create_view_calls: AtomicUsize,
}

impl TestSpec {
    fn new(has_rows: bool) -> Arc<Self> {
        Arc::new(TestSpec {
            has_rows,
            create_view_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AggregationSpec for TestSpec {
    async fn create_view(
        &self,
        _engine: &dyn Engine,
        _area: &Area,
    ) -> tracedeck_engine::Result<bool> {
        self.create_view_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.has_rows)
    }

    async fn extra(
        &self,
        _engine: &dyn Engine,
        _area: &Area,
    ) -> tracedeck_engine::Result<Option<AggregateExtra>> {
        Ok(None)
    }

    fn tab_name(&self) -> String {
        "CPU by thread".into()
    }

    fn default_sorting(&self) -> Sorting {
        Sorting {
            column: "total_dur".into(),
            direction: SortDirection::Desc,
        }
    }

    fn column_defs(&self) -> Vec<ColumnDef> {
        vec![
            ColumnDef {
                column_id: "thread_name".into(),
                title: "Thread".into(),
                kind: ColumnKind::String,
                summable: false,
            },
            ColumnDef {
                column_id: "total_dur".into(),
                title: "Total duration".into(),
                kind: ColumnKind::TimestampNs,
                summable: true,
            },
        ]
    }
}

fn fresh_area() -> Arc<Area> {
    Arc::new(Area {
        time: TimeSpan::new(1.0, 2.0),
        tracks: Vec::new(),
    })
}

fn snapshot_with_area(area: &Arc<Area>) -> StoreSnapshot {
    let mut snapshot = StoreSnapshot::default();
    snapshot.current_selection = Some(Selection::Area {
        area_id: "sel".into(),
    });
    snapshot.areas.insert("sel".into(), Arc::clone(area));
    snapshot
}

fn default_rows(engine: &FakeEngine) {
    engine.respond(
        "order by",
        result(vec![
            strings("thread_name", vec!["a", "b", "a"]),
            longs("total_dur", vec![1, 2, 3]),
        ]),
    );
    engine.respond_one_row("sum(total_dur)", vec![QueryValue::Long(5_000_000)]);
}

fn aggregates(publisher: &FakePublisher) -> Vec<AggregateResult> {
    publisher
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Aggregate { kind, data } if kind == KIND => Some(data),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_non_area_selection_publishes_empty_without_querying() {
    let engine = Arc::new(FakeEngine::new());
    let store = Arc::new(FakeStore::new(StoreSnapshot::default()));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let mut controller =
        AggregationController::new(KIND, TestSpec::new(true), engine.clone() as _, &cx);
    controller.run(&cx).unwrap();

    let published = aggregates(&publisher);
    assert_eq!(published.len(), 1);
    assert!(published[0].is_empty());
    assert!(published[0].strings.is_empty());
    assert!(published[0].column_sums.is_empty());
    assert!(engine.queries.lock().is_empty());
}

#[tokio::test]
async fn test_unchanged_area_and_sorting_issues_no_second_query() {
    let engine = Arc::new(FakeEngine::new());
    default_rows(&engine);
    let area = fresh_area();
    let store = Arc::new(FakeStore::new(snapshot_with_area(&area)));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let mut controller =
        AggregationController::new(KIND, TestSpec::new(true), engine.clone() as _, &cx);
    controller.run(&cx).unwrap();
    wait_for(|| !aggregates(&publisher).is_empty()).await;
    let after_first = engine.queries.lock().len();

    // Same Arc<Area>, same sorting: the second tick must no-op.
    controller.run(&cx).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(engine.queries.lock().len(), after_first);
    assert_eq!(aggregates(&publisher).len(), 1);
}

#[tokio::test]
async fn test_triggers_mid_flight_coalesce_into_one_rerun() {
    let engine = Arc::new(FakeEngine::new());
    default_rows(&engine);
    let gate = engine.hold_queries();
    let area = fresh_area();
    let store = Arc::new(FakeStore::new(snapshot_with_area(&area)));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let mut controller =
        AggregationController::new(KIND, TestSpec::new(true), engine.clone() as _, &cx);
    controller.run(&cx).unwrap();
    wait_for(|| engine.queries_matching("order by") == 1).await;

    // Three area replacements land while the first fetch is stuck.
    for _ in 0..3 {
        store
            .snapshot
            .lock()
            .areas
            .insert("sel".into(), fresh_area());
        controller.run(&cx).unwrap();
    }
    assert_eq!(engine.queries_matching("order by"), 1);

    gate.add_permits(1000);
    wait_for(|| aggregates(&publisher).len() == 2).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Exactly one extra fetch ran: not three, not zero.
    assert_eq!(engine.queries_matching("order by"), 2);
    assert_eq!(aggregates(&publisher).len(), 2);
}

#[tokio::test]
async fn test_materialization_interns_strings_and_formats_sums() {
    let engine = Arc::new(FakeEngine::new());
    default_rows(&engine);
    let area = fresh_area();
    let store = Arc::new(FakeStore::new(snapshot_with_area(&area)));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let mut controller =
        AggregationController::new(KIND, TestSpec::new(true), engine.clone() as _, &cx);
    controller.run(&cx).unwrap();
    wait_for(|| !aggregates(&publisher).is_empty()).await;

    let data = aggregates(&publisher).remove(0);
    assert_eq!(data.tab_name, "CPU by thread");
    assert_eq!(data.strings, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(data.columns[0].data, ColumnData::String(vec![0, 1, 0]));
    assert_eq!(data.columns[1].data, ColumnData::Integer(vec![1, 2, 3]));
    // Non-summable column reports "", the ns sum is rescaled to ms.
    assert_eq!(data.column_sums, vec!["".to_string(), "5".to_string()]);
}

#[tokio::test]
async fn test_empty_view_publishes_empty_result_without_select() {
    let engine = Arc::new(FakeEngine::new());
    let area = fresh_area();
    let store = Arc::new(FakeStore::new(snapshot_with_area(&area)));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let spec = TestSpec::new(false);
    let mut controller =
        AggregationController::new(KIND, Arc::clone(&spec) as _, engine.clone() as _, &cx);
    controller.run(&cx).unwrap();
    wait_for(|| !aggregates(&publisher).is_empty()).await;

    assert!(aggregates(&publisher)[0].is_empty());
    assert_eq!(spec.create_view_calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.queries_matching("order by"), 0);
}

#[tokio::test]
async fn test_sorting_change_refetches_with_new_order() {
    let engine = Arc::new(FakeEngine::new());
    default_rows(&engine);
    let area = fresh_area();
    let store = Arc::new(FakeStore::new(snapshot_with_area(&area)));
    let publisher = Arc::new(FakePublisher::new());
    let cx = context(&store, &publisher, &engine);

    let mut controller =
        AggregationController::new(KIND, TestSpec::new(true), engine.clone() as _, &cx);
    controller.run(&cx).unwrap();
    wait_for(|| aggregates(&publisher).len() == 1).await;
    assert_eq!(engine.queries_matching("order by total_dur DESC"), 1);

    store.snapshot.lock().aggregate_preferences.insert(
        KIND.into(),
        AggregatePreference {
            sorting: Some(Sorting {
                column: "thread_name".into(),
                direction: SortDirection::Asc,
            }),
        },
    );
    controller.run(&cx).unwrap();
    wait_for(|| aggregates(&publisher).len() == 2).await;
    assert_eq!(engine.queries_matching("order by thread_name ASC"), 1);
}
