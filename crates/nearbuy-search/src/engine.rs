//! Progressive nearby-seller search.
//!
//! A search widens a filled hexagonal disk around the user one ring at a
//! time, querying only the cells it has not seen yet, until enough distinct
//! sellers have been collected to fill the requested page. If the ring
//! bound is reached first, one unindexed catalog scan tops the result up.
//! The accumulated sellers are then ranked by great-circle distance.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use nearbuy_core::{CatalogFilter, CatalogStore, SearchFilter, SellerBundle};
use nearbuy_geo::{haversine_km, Coordinate, GeoCell, GeoGrid};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::fanout::fan_out;

/// A seller bundle together with its distance from the searching user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySeller {
    #[serde(flatten)]
    pub bundle: SellerBundle,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    /// Requested page, nearest first.
    pub sellers: Vec<NearbySeller>,
    /// Distinct sellers collected before pagination.
    pub total: usize,
}

/// Per-call expansion state. Only the search loop writes to it, after each
/// ring's queries have been joined.
#[derive(Default)]
struct Expansion {
    seen_cells: HashSet<i64>,
    seen_sellers: HashSet<i64>,
    found: Vec<SellerBundle>,
}

impl Expansion {
    /// Keeps the cells of `ring` that have not been queried yet and marks them seen.
    fn claim_cells(&mut self, ring: Vec<GeoCell>) -> Vec<GeoCell> {
        ring.into_iter()
            .filter(|cell| self.seen_cells.insert(cell.id()))
            .collect()
    }

    /// Appends bundles whose seller has not been seen, in arrival order.
    fn merge(&mut self, batch: Vec<SellerBundle>) -> usize {
        let before = self.found.len();
        for bundle in batch {
            if self.seen_sellers.insert(bundle.seller.id) {
                self.found.push(bundle);
            }
        }
        self.found.len() - before
    }

    fn len(&self) -> usize {
        self.found.len()
    }
}

pub struct NearbySearchEngine {
    grid: Arc<dyn GeoGrid>,
    store: Arc<dyn CatalogStore>,
    config: SearchConfig,
}

impl NearbySearchEngine {
    #[must_use]
    pub fn new(grid: Arc<dyn GeoGrid>, store: Arc<dyn CatalogStore>, config: SearchConfig) -> Self {
        Self {
            grid,
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Finds sellers near `user` matching `filter`, nearest first.
    ///
    /// When `filter.seller_id` is set the spatial search is skipped and that
    /// seller alone is returned. An `offset` past the end of the collected
    /// sellers yields an empty page.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidLimit`] if `filter.limit` is zero.
    /// - [`SearchError::Grid`] if the configured resolution is invalid.
    /// - [`SearchError::Store`] on any catalog failure; no partial page is returned.
    /// - [`SearchError::DeadlineExceeded`] if the configured timeout elapses
    ///   between rings.
    pub async fn find_nearby(
        &self,
        user: Coordinate,
        filter: &SearchFilter,
    ) -> Result<SearchPage, SearchError> {
        if filter.limit == 0 {
            return Err(SearchError::InvalidLimit);
        }

        if let Some(seller_id) = filter.seller_id {
            let bundle = self.store.get_by_id(seller_id).await?;
            tracing::debug!(seller_id, "nearby search resolved by seller id");
            return Ok(SearchPage {
                sellers: vec![rank(user, bundle)],
                total: 1,
            });
        }

        let found = self.expand(user, filter).await?;
        let total = found.len();

        let mut ranked: Vec<NearbySeller> =
            found.into_iter().map(|bundle| rank(user, bundle)).collect();
        // Stable, so equal distances keep discovery order.
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let sellers: Vec<NearbySeller> = ranked
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        tracing::info!(
            total,
            returned = sellers.len(),
            offset = filter.offset,
            limit = filter.limit,
            "nearby search complete"
        );

        Ok(SearchPage { sellers, total })
    }

    async fn expand(
        &self,
        user: Coordinate,
        filter: &SearchFilter,
    ) -> Result<Vec<SellerBundle>, SearchError> {
        let required = filter.required();
        let catalog_filter = filter.catalog_filter();
        let resolution = self.config.base_resolution;
        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);

        let mut state = Expansion::default();
        let mut k: u32 = 1;

        while state.len() < required && k <= self.config.max_ring {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SearchError::DeadlineExceeded {
                    rings_searched: k - 1,
                });
            }

            let ring = self.grid.ring(user, resolution, k)?;
            let fresh = state.claim_cells(ring);
            let cells_queried = fresh.len();

            let batches = self.query_cells(fresh, &catalog_filter).await?;
            let added: usize = batches.into_iter().map(|b| state.merge(b)).sum();

            tracing::debug!(
                k,
                resolution,
                cells_queried,
                added,
                found = state.len(),
                required,
                "ring searched"
            );
            k += 1;
        }

        if state.len() < required {
            tracing::warn!(
                found = state.len(),
                required,
                max_ring = self.config.max_ring,
                "ring expansion exhausted, scanning unindexed catalog"
            );
            let rest = self.store.query_unindexed(&catalog_filter).await?;
            let added = state.merge(rest);
            tracing::debug!(added, found = state.len(), "unindexed scan merged");
        }

        Ok(state.found)
    }

    /// Queries every cell concurrently and waits for all of them.
    async fn query_cells(
        &self,
        cells: Vec<GeoCell>,
        filter: &CatalogFilter,
    ) -> Result<Vec<Vec<SellerBundle>>, SearchError> {
        let store = &self.store;
        let batches = fan_out(cells, self.config.max_concurrent_cells, |cell| async move {
            store.query_by_cell(cell, filter).await
        })
        .await?;
        Ok(batches)
    }
}

fn rank(user: Coordinate, bundle: SellerBundle) -> NearbySeller {
    NearbySeller {
        distance_km: haversine_km(user, bundle.seller.location),
        bundle,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
