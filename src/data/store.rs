use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::loader;
use super::model::Row;
use crate::error::StoreError;

/// The once-loaded track table.
///
/// The first caller of [`RowStore::rows`] fetches and parses the source;
/// concurrent callers wait on the same cell and later callers read the
/// cached slice. A failed fetch leaves the cell empty and each waiter then
/// retries in turn, so the scheduler reads the store once per pass.
#[derive(Debug)]
pub struct RowStore {
    source: Option<PathBuf>,
    cache: OnceCell<Arc<[Row]>>,
    fetches: AtomicUsize,
}

impl RowStore {
    /// A store backed by a file, loaded lazily on first access.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            cache: OnceCell::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A store over rows already in memory.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            source: None,
            cache: OnceCell::new_with(Some(Arc::from(rows))),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of times the source has actually been read.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// The cached rows, loading them on first use.
    pub async fn rows(&self) -> Result<Arc<[Row]>, StoreError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Arc::clone)
    }

    async fn fetch(&self) -> Result<Arc<[Row]>, StoreError> {
        // from_rows always initialises the cell, so a missing source means
        // the cell was never seeded.
        let Some(path) = self.source.clone() else {
            return Ok(Arc::from(Vec::new()));
        };
        self.fetches.fetch_add(1, Ordering::Relaxed);
        log::debug!("fetching track table from {}", path.display());

        let loaded = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || loader::load_file(&path)).await?
        };
        match loaded {
            Ok(rows) => Ok(Arc::from(rows)),
            Err(e) => {
                log::error!("failed to load {}: {e:#}", path.display());
                Err(StoreError::Load {
                    path,
                    message: format!("{e:#}"),
                })
            }
        }
    }
}
