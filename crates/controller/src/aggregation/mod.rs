//! Per-kind aggregation controllers.
//!
//! An aggregation "kind" names both a backing view in the engine and a
//! UI tab. The kind-specific behavior is injected as an
//! [`AggregationSpec`] capability set; one shared controller handles
//! change detection, request coalescing and result materialization for
//! every kind.
//!
//! ## Coalescing protocol
//!
//! At most one fetch is in flight per controller instance. A trigger
//! arriving mid-fetch sets a pending-rerun flag instead of starting a
//! second fetch; on completion (success or failure) the flag is
//! consumed and the entry point re-runs once against the latest store
//! snapshot, where change detection may short-circuit. N mid-flight
//! triggers therefore collapse into exactly one extra fetch.

mod materialize;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use parking_lot::{Mutex, RwLock};
use tracedeck_core::{
    AggregateExtra, AggregateResult, Area, ColumnDef, ColumnKind, Selection, Sorting,
    StringInterner,
};
use tracedeck_engine::Engine;

use crate::controller::{ChildSpec, Controller, ControllerContext};
use crate::error::Result;
use crate::publish::{Event, Publisher};
use crate::store::StateStore;

/// Kind-specific capabilities of one aggregation.
///
/// Supplied by the host per kind and injected into the shared
/// controller, which owns all change detection and coalescing.
#[async_trait]
pub trait AggregationSpec: Send + Sync {
    /// (Re)build the backing view for `area`. Returns whether the view
    /// has any rows.
    async fn create_view(&self, engine: &dyn Engine, area: &Area)
        -> tracedeck_engine::Result<bool>;

    /// Kind-specific extra summary, if the kind defines one.
    async fn extra(
        &self,
        engine: &dyn Engine,
        area: &Area,
    ) -> tracedeck_engine::Result<Option<AggregateExtra>>;

    /// UI tab title.
    fn tab_name(&self) -> String;

    /// Sort order used when the store holds no preference.
    fn default_sorting(&self) -> Sorting;

    /// Declared columns of the backing view.
    fn column_defs(&self) -> Vec<ColumnDef>;
}

/// Registry of aggregation capability sets, keyed by kind.
#[derive(Default)]
pub struct AggregationRegistry {
    specs: RwLock<BTreeMap<String, Arc<dyn AggregationSpec>>>,
}

impl AggregationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the capability set for `kind`.
    pub fn register(&self, kind: impl Into<String>, spec: Arc<dyn AggregationSpec>) {
        self.specs.write().insert(kind.into(), spec);
    }

    /// Snapshot of the registered kinds.
    pub fn kinds(&self) -> Vec<(String, Arc<dyn AggregationSpec>)> {
        self.specs
            .read()
            .iter()
            .map(|(k, s)| (k.clone(), Arc::clone(s)))
            .collect()
    }
}

/// Idle/Busy latch plus the cached change-detection snapshots.
#[derive(Default)]
struct FetchState {
    prev_area: Option<Arc<Area>>,
    prev_sorting: Option<Sorting>,
    requesting: bool,
    queued: bool,
}

struct Inner {
    kind: String,
    spec: Arc<dyn AggregationSpec>,
    engine: Arc<dyn Engine>,
    store: Arc<dyn StateStore>,
    publisher: Arc<dyn Publisher>,
    state: Mutex<FetchState>,
}

/// Watches the current area selection for one aggregation kind and
/// publishes a materialized [`AggregateResult`] whenever the area or
/// sort preference changes.
pub struct AggregationController {
    inner: Arc<Inner>,
}

impl AggregationController {
    /// A controller for `kind`, using the read-shared `engine` of the
    /// owning trace.
    pub fn new(
        kind: impl Into<String>,
        spec: Arc<dyn AggregationSpec>,
        engine: Arc<dyn Engine>,
        cx: &ControllerContext,
    ) -> Self {
        AggregationController {
            inner: Arc::new(Inner {
                kind: kind.into(),
                spec,
                engine,
                store: Arc::clone(&cx.store),
                publisher: Arc::clone(&cx.publisher),
                state: Mutex::new(FetchState::default()),
            }),
        }
    }
}

impl Controller for AggregationController {
    fn run(&mut self, _cx: &ControllerContext) -> Result<Option<Vec<ChildSpec>>> {
        Inner::tick(&self.inner);
        Ok(None)
    }
}

impl Inner {
    /// The per-tick entry point; also re-invoked once when a queued
    /// rerun fires on fetch completion.
    fn tick(self: &Arc<Self>) {
        let snapshot = self.store.snapshot();

        let area = match &snapshot.current_selection {
            Some(Selection::Area { area_id }) => snapshot.areas.get(area_id).cloned(),
            _ => None,
        };
        let Some(area) = area else {
            // No area selected: the tab shows an empty table and no
            // query is issued.
            self.publisher.publish(Event::Aggregate {
                kind: self.kind.clone(),
                data: AggregateResult::empty(self.spec.tab_name()),
            });
            return;
        };

        let preference = snapshot.aggregate_preferences.get(&self.kind);
        let pref_sorting = preference.and_then(|p| p.sorting.clone());

        let mut state = self.state.lock();
        let area_changed = !state
            .prev_area
            .as_ref()
            .is_some_and(|prev| Arc::ptr_eq(prev, &area));
        let sorting_changed = preference.is_some() && state.prev_sorting != pref_sorting;
        if !area_changed && !sorting_changed {
            return;
        }

        if state.requesting {
            state.queued = true;
            return;
        }
        state.requesting = true;
        if sorting_changed {
            state.prev_sorting = pref_sorting.clone();
        }
        if area_changed {
            state.prev_area = Some(Arc::clone(&area));
        }
        drop(state);

        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.fetch(&area, area_changed, pref_sorting).await {
                Ok(data) => this.publisher.publish(Event::Aggregate {
                    kind: this.kind.clone(),
                    data,
                }),
                Err(err) => {
                    tracing::error!(kind = this.kind.as_str(), error = %err, "aggregate fetch failed");
                }
            }
            let rerun = {
                let mut state = this.state.lock();
                state.requesting = false;
                std::mem::take(&mut state.queued)
            };
            if rerun {
                Inner::tick(&this);
            }
        });
    }

    /// Fetch and materialize the aggregate table.
    async fn fetch(
        &self,
        area: &Area,
        area_changed: bool,
        sorting: Option<Sorting>,
    ) -> Result<AggregateResult> {
        if area_changed {
            let has_rows = self.spec.create_view(self.engine.as_ref(), area).await?;
            if !has_rows {
                return Ok(AggregateResult::empty(self.spec.tab_name()));
            }
        }

        let defs = self.spec.column_defs();
        let sorting = sorting.unwrap_or_else(|| self.spec.default_sorting());
        let column_ids: Vec<&str> = defs.iter().map(|d| d.column_id.as_str()).collect();
        let sql = format!(
            "select {} from {} order by {}",
            column_ids.join(", "),
            self.kind,
            sorting.as_sql()
        );
        let result = self.engine.query(&sql).await?;

        let mut interner = StringInterner::new();
        let columns = materialize::materialize_columns(&defs, &result, &mut interner)?;

        let column_sums = try_join_all(defs.iter().map(|def| self.column_sum(def))).await?;
        let extra = self.spec.extra(self.engine.as_ref(), area).await?;

        Ok(AggregateResult {
            tab_name: self.spec.tab_name(),
            columns,
            column_sums,
            strings: interner.into_table(),
            extra,
        })
    }

    /// Formatted `sum()` of one column; empty for non-summable
    /// columns, rescaled ns → ms for timestamp columns.
    async fn column_sum(&self, def: &ColumnDef) -> Result<String> {
        if !def.summable {
            return Ok(String::new());
        }
        let sql = format!("select sum({}) from {}", def.column_id, self.kind);
        let row = self.engine.query_one_row(&sql).await?;
        let mut sum = row.first().map(|v| v.as_f64()).unwrap_or(0.0);
        if def.kind == ColumnKind::TimestampNs {
            sum /= 1e6;
        }
        Ok(format!("{sum}"))
    }
}
