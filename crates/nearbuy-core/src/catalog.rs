//! The seller catalog as seen by the search and routing code.
//!
//! Implementations own persistence and apply the [`CatalogFilter`]
//! predicates themselves. They must be safe for concurrent reads since the
//! search engine queries several cells at once.

use async_trait::async_trait;
use nearbuy_geo::GeoCell;
use thiserror::Error;

use crate::model::{CatalogFilter, SellerBundle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("seller {seller_id} not found")]
    NotFound { seller_id: i64 },

    #[error("catalog store failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Sellers registered inside `cell` that satisfy `filter`.
    async fn query_by_cell(
        &self,
        cell: GeoCell,
        filter: &CatalogFilter,
    ) -> Result<Vec<SellerBundle>, StoreError>;

    /// Every seller that satisfies `filter`, regardless of location.
    async fn query_unindexed(&self, filter: &CatalogFilter)
        -> Result<Vec<SellerBundle>, StoreError>;

    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no seller has this id.
    async fn get_by_id(&self, seller_id: i64) -> Result<SellerBundle, StoreError>;

    /// Liveness probe for health endpoints.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
