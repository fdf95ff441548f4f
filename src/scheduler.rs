//! Recompute scheduler: runs every view builder for a filter state and
//! publishes the resulting [`ViewSet`].
//!
//! Two triggers exist. A filter change runs a pass immediately and the caller
//! awaits it. A resize is debounced: each call starts a timer and bumps a
//! generation counter, and only the timer whose generation is still current
//! when it fires runs a pass. Passes already running are never cancelled.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::watch;

use crate::data::filter::FilterState;
use crate::data::model::Row;
use crate::data::store::RowStore;
use crate::error::ViewError;
use crate::views::{DerivedView, Trigger, ViewKind, ViewSet};

/// Quiet window before a resize triggers a pass.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Builds one view from the shared rows.
type BuildFn = fn(ViewKind, &[Row], &FilterState) -> DerivedView;

struct Inner {
    store: Arc<RowStore>,
    build: BuildFn,
    debounce: Duration,
    passes: AtomicU64,
    resize_generation: AtomicU64,
    views_tx: watch::Sender<Arc<ViewSet>>,
}

/// Cheap to clone; clones share the same published views.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(store: Arc<RowStore>, debounce: Duration) -> Self {
        Self::with_builder(store, debounce, ViewKind::build)
    }

    fn with_builder(store: Arc<RowStore>, debounce: Duration, build: BuildFn) -> Self {
        let (views_tx, _) = watch::channel(Arc::new(ViewSet::empty()));
        Self {
            inner: Arc::new(Inner {
                store,
                build,
                debounce,
                passes: AtomicU64::new(0),
                resize_generation: AtomicU64::new(0),
                views_tx,
            }),
        }
    }

    /// The most recently published views.
    pub fn latest(&self) -> Arc<ViewSet> {
        self.inner.views_tx.borrow().clone()
    }

    /// Receive every published [`ViewSet`].
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewSet>> {
        self.inner.views_tx.subscribe()
    }

    /// Run a pass for `filters` and publish it before returning.
    pub async fn recompute(&self, filters: &FilterState, trigger: Trigger) -> Arc<ViewSet> {
        let set = Arc::new(self.inner.run_pass(filters.clone(), trigger).await);
        self.inner.views_tx.send_replace(Arc::clone(&set));
        set
    }

    /// Schedule a debounced pass. Supersedes any resize still waiting.
    pub fn resize(&self) {
        let generation = self.inner.resize_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.resize_generation.load(Ordering::SeqCst) != generation {
                log::debug!("resize timer {generation} superseded");
                return;
            }
            let filters = inner.views_tx.borrow().filters.clone();
            let set = Arc::new(inner.run_pass(filters.clone(), Trigger::Resize).await);
            // A filter change that landed mid-pass already published newer views.
            let published = inner.views_tx.send_if_modified(|current| {
                if current.filters == filters {
                    *current = set;
                    true
                } else {
                    false
                }
            });
            if !published {
                log::debug!("resize pass discarded: filters changed while it ran");
            }
        });
    }
}

impl Inner {
    /// Fetch the rows once, then fan out one task per view and wait for all
    /// of them. A failing task only marks its own view as failed.
    async fn run_pass(&self, filters: FilterState, trigger: Trigger) -> ViewSet {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let filters = Arc::new(filters);
        let rows = self
            .store
            .rows()
            .await
            .map_err(|e| ViewError::Load(e.to_string()));

        let handles = ViewKind::ALL.map(|kind| {
            let rows = rows.clone();
            let filters = Arc::clone(&filters);
            let build = self.build;
            tokio::spawn(async move { rows.map(|rows| build(kind, &rows, &filters)) })
        });

        let mut views = BTreeMap::new();
        for (kind, joined) in ViewKind::ALL.into_iter().zip(join_all(handles).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(ViewError::Builder(e.to_string())),
            };
            if let Err(e) = &result {
                log::warn!("pass {pass}: view {kind} failed: {e}");
            }
            views.insert(kind, result);
        }

        log::info!(
            "pass {pass} ({trigger:?}) built {} views in {:?}",
            views.len(),
            started.elapsed()
        );
        ViewSet::new(pass, trigger, (*filters).clone(), views)
    }
}
