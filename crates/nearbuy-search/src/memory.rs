//! In-memory [`CatalogStore`].
//!
//! Indexes every seller at all grid resolutions, mirroring the
//! `seller_cells` table, and evaluates [`CatalogFilter`] in process. Query
//! counters, artificial latency and failure injection make it the standard
//! collaborator for exercising the search and routing code.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nearbuy_core::{CatalogFilter, CatalogStore, SellerBundle, StoreError};
use nearbuy_geo::{GeoCell, GeoError, GeoGrid};

#[derive(Default)]
struct Counters {
    cell_queries: AtomicUsize,
    unindexed_queries: AtomicUsize,
    id_lookups: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

pub struct MemoryCatalog {
    bundles: Vec<SellerBundle>,
    by_cell: HashMap<GeoCell, Vec<usize>>,
    failing_cells: HashSet<i64>,
    fail_unindexed: bool,
    latency: Option<Duration>,
    counters: Counters,
}

impl MemoryCatalog {
    /// Builds a catalog over `bundles`, locating each seller with `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if a seller location cannot be placed on the grid.
    pub fn new(grid: &dyn GeoGrid, bundles: Vec<SellerBundle>) -> Result<Self, GeoError> {
        let mut by_cell: HashMap<GeoCell, Vec<usize>> = HashMap::new();
        for (idx, bundle) in bundles.iter().enumerate() {
            for cell in grid.cell_path(bundle.seller.location)? {
                by_cell.entry(cell).or_default().push(idx);
            }
        }

        Ok(Self {
            bundles,
            by_cell,
            failing_cells: HashSet::new(),
            fail_unindexed: false,
            latency: None,
            counters: Counters::default(),
        })
    }

    /// Makes every query for the cell with this id fail.
    #[must_use]
    pub fn fail_on_cell(mut self, cell_id: i64) -> Self {
        self.failing_cells.insert(cell_id);
        self
    }

    #[must_use]
    pub fn fail_unindexed(mut self) -> Self {
        self.fail_unindexed = true;
        self
    }

    /// Delays every query by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn cell_queries(&self) -> usize {
        self.counters.cell_queries.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn unindexed_queries(&self) -> usize {
        self.counters.unindexed_queries.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn id_lookups(&self) -> usize {
        self.counters.id_lookups.load(Ordering::SeqCst)
    }

    /// Highest number of queries observed running at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn matching<'a>(
        &'a self,
        indices: impl Iterator<Item = usize> + 'a,
        filter: &'a CatalogFilter,
    ) -> impl Iterator<Item = SellerBundle> + 'a {
        indices
            .map(|idx| &self.bundles[idx])
            .filter(|bundle| filter.matches(bundle))
            .cloned()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn query_by_cell(
        &self,
        cell: GeoCell,
        filter: &CatalogFilter,
    ) -> Result<Vec<SellerBundle>, StoreError> {
        self.counters.cell_queries.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        let result = if self.failing_cells.contains(&cell.id()) {
            Err(StoreError::Backend(format!("cell {} unavailable", cell.id())))
        } else {
            let indices = self.by_cell.get(&cell).into_iter().flatten().copied();
            Ok(self.matching(indices, filter).collect())
        };
        self.leave();
        result
    }

    async fn query_unindexed(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<SellerBundle>, StoreError> {
        self.counters.unindexed_queries.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        let result = if self.fail_unindexed {
            Err(StoreError::Backend("unindexed scan unavailable".to_string()))
        } else {
            Ok(self.matching(0..self.bundles.len(), filter).collect())
        };
        self.leave();
        result
    }

    async fn get_by_id(&self, seller_id: i64) -> Result<SellerBundle, StoreError> {
        self.counters.id_lookups.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        let result = self
            .bundles
            .iter()
            .find(|bundle| bundle.seller.id == seller_id)
            .cloned()
            .ok_or(StoreError::NotFound { seller_id });
        self.leave();
        result
    }
}
