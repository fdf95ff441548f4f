use std::sync::Arc;

use tokio::sync::watch;

use crate::config::DashboardConfig;
use crate::data::filter::{FilterState, FilterUpdate};
use crate::data::store::RowStore;
use crate::scheduler::Scheduler;
use crate::views::{Trigger, ViewSet};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The single owner of the filter state.
///
/// Every mutation replaces the state with a new value and then awaits a
/// filter-change pass, so the returned views always match [`Self::filters`].
/// Taking `&mut self` keeps mutations single-writer.
pub struct Dashboard {
    filters: FilterState,
    scheduler: Scheduler,
}

impl Dashboard {
    pub fn new(store: Arc<RowStore>, config: &DashboardConfig) -> Self {
        Self {
            filters: FilterState::default(),
            scheduler: Scheduler::new(store, config.resize_debounce()),
        }
    }

    /// Current selection.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// First pass after the table becomes available.
    pub async fn load(&mut self) -> Arc<ViewSet> {
        self.scheduler.recompute(&self.filters, Trigger::Load).await
    }

    /// Replace one filter axis.
    pub async fn set_filter(&mut self, update: FilterUpdate) -> Arc<ViewSet> {
        log::debug!("set filter {:?}", update.axis());
        let next = self.filters.apply(update);
        self.replace(next).await
    }

    /// Add or remove a genre from the selection.
    pub async fn toggle_genre(&mut self, name: &str) -> Arc<ViewSet> {
        let next = self.filters.toggle_genre(name);
        self.replace(next).await
    }

    pub async fn toggle_subgenre(&mut self, name: &str) -> Arc<ViewSet> {
        let next = self.filters.toggle_subgenre(name);
        self.replace(next).await
    }

    /// Drop every constraint.
    pub async fn clear_all(&mut self) -> Arc<ViewSet> {
        self.replace(FilterState::default()).await
    }

    /// Viewport changed size; views are rebuilt after the debounce window.
    pub fn resize(&self) {
        self.scheduler.resize();
    }

    /// Latest published views.
    pub fn views(&self) -> Arc<ViewSet> {
        self.scheduler.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewSet>> {
        self.scheduler.subscribe()
    }

    async fn replace(&mut self, next: FilterState) -> Arc<ViewSet> {
        self.filters = next;
        self.scheduler
            .recompute(&self.filters, Trigger::FilterChange)
            .await
    }
}
