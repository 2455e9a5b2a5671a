//! Postgres-backed [`CatalogStore`].

use async_trait::async_trait;
use nearbuy_core::{CatalogFilter, CatalogStore, SellerBundle, StoreError};
use nearbuy_geo::GeoCell;
use sqlx::PgPool;

use crate::sellers::{get_seller_by_id, list_sellers_in_cell, list_sellers_unindexed};
use crate::{ping, DbError};

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn query_by_cell(
        &self,
        cell: GeoCell,
        filter: &CatalogFilter,
    ) -> Result<Vec<SellerBundle>, StoreError> {
        let rows = list_sellers_in_cell(&self.pool, cell, filter)
            .await
            .inspect_err(|e| tracing::error!(cell = cell.id(), error = %e, "cell query failed"))?;
        Ok(rows.into_iter().map(SellerBundle::from).collect())
    }

    async fn query_unindexed(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<SellerBundle>, StoreError> {
        let rows = list_sellers_unindexed(&self.pool, filter)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "unindexed query failed"))?;
        Ok(rows.into_iter().map(SellerBundle::from).collect())
    }

    async fn get_by_id(&self, seller_id: i64) -> Result<SellerBundle, StoreError> {
        get_seller_by_id(&self.pool, seller_id)
            .await?
            .map(SellerBundle::from)
            .ok_or(StoreError::NotFound { seller_id })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        ping(&self.pool).await.map_err(|e| StoreError::Backend(e.to_string()))
    }
}
