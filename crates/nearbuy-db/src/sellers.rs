//! Database operations for the `sellers` and `items` tables.

use chrono::{DateTime, Utc};
use nearbuy_core::{CatalogFilter, Item, Seller, SellerBundle};
use nearbuy_geo::{Coordinate, GeoCell, GeoGrid};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::cells::insert_seller_cells;
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A seller row joined with its items, aggregated as JSON.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SellerRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub items: Json<Vec<ItemRow>>,
}

/// One element of the `items` aggregate, ordered by `created_at, id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            image_url: row.image_url,
            price: row.price,
            created_at: row.created_at,
        }
    }
}

impl From<SellerRow> for SellerBundle {
    fn from(row: SellerRow) -> Self {
        Self {
            seller: Seller {
                id: row.id,
                name: row.name,
                category: row.category,
                image_url: row.image_url,
                location: Coordinate::new(row.latitude, row.longitude),
                created_at: row.created_at,
            },
            items: row.items.0.into_iter().map(Item::from).collect(),
        }
    }
}

/// Input record for registering a seller.
#[derive(Debug, Clone)]
pub struct NewSeller {
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub location: Coordinate,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Builds the bundle query for one selection scope.
///
/// `$1` is the optional name substring and `$2` the optional category; the
/// scope may bind from `$3` on. The name matches the seller name or any item
/// name, case-insensitively.
pub(crate) fn bundle_query(scope: &str) -> String {
    format!(
        "SELECT s.id, s.name, s.category, s.image_url, s.latitude, s.longitude, s.created_at, \
                COALESCE(\
                    json_agg(json_build_object(\
                        'id', i.id, 'name', i.name, 'category', i.category, \
                        'image_url', i.image_url, 'price', i.price, 'created_at', i.created_at\
                    ) ORDER BY i.created_at, i.id) FILTER (WHERE i.id IS NOT NULL), \
                    '[]'::json\
                ) AS items \
         FROM sellers s \
         LEFT JOIN items i ON i.seller_id = s.id \
         WHERE {scope} \
           AND ($2::text IS NULL OR LOWER(s.category) = LOWER($2)) \
           AND ($1::text IS NULL \
                OR STRPOS(LOWER(s.name), LOWER($1)) > 0 \
                OR EXISTS (\
                    SELECT 1 FROM items n \
                    WHERE n.seller_id = s.id AND STRPOS(LOWER(n.name), LOWER($1)) > 0\
                )) \
         GROUP BY s.id \
         ORDER BY s.id"
    )
}

/// Sellers indexed in `cell` that satisfy `filter`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sellers_in_cell(
    pool: &PgPool,
    cell: GeoCell,
    filter: &CatalogFilter,
) -> Result<Vec<SellerRow>, DbError> {
    let sql = bundle_query(
        "s.id IN (SELECT sc.seller_id FROM seller_cells sc \
                  WHERE sc.h3_index = $3 AND sc.resolution = $4)",
    );
    let rows = sqlx::query_as::<_, SellerRow>(&sql)
        .bind(filter.name.as_deref())
        .bind(filter.category.as_deref())
        .bind(cell.id())
        .bind(i16::from(cell.resolution()))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Every seller that satisfies `filter`, ignoring location.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sellers_unindexed(
    pool: &PgPool,
    filter: &CatalogFilter,
) -> Result<Vec<SellerRow>, DbError> {
    let sql = bundle_query("TRUE");
    let rows = sqlx::query_as::<_, SellerRow>(&sql)
        .bind(filter.name.as_deref())
        .bind(filter.category.as_deref())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a single seller with its items, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_seller_by_id(pool: &PgPool, seller_id: i64) -> Result<Option<SellerRow>, DbError> {
    let sql = bundle_query("s.id = $3");
    let row = sqlx::query_as::<_, SellerRow>(&sql)
        .bind(None::<&str>)
        .bind(None::<&str>)
        .bind(seller_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Inserts a seller, its items and its cell index rows in one transaction.
///
/// Returns the new seller id.
///
/// # Errors
///
/// Returns [`DbError::Geo`] if the location is invalid, or [`DbError::Sqlx`]
/// if any insert fails. Nothing is written on error.
pub async fn insert_seller(
    pool: &PgPool,
    grid: &dyn GeoGrid,
    seller: &NewSeller,
    items: &[NewItem],
) -> Result<i64, DbError> {
    seller.location.validate()?;
    let cells = grid.cell_path(seller.location)?;

    let mut tx = pool.begin().await?;

    let seller_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sellers (name, category, image_url, latitude, longitude) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(&seller.name)
    .bind(&seller.category)
    .bind(&seller.image_url)
    .bind(seller.location.lat)
    .bind(seller.location.long)
    .fetch_one(&mut *tx)
    .await?;

    if !items.is_empty() {
        let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        let categories: Vec<String> = items.iter().map(|i| i.category.clone()).collect();
        let prices: Vec<i64> = items.iter().map(|i| i.price).collect();
        let image_urls: Vec<String> = items.iter().map(|i| i.image_url.clone()).collect();

        sqlx::query(
            "INSERT INTO items (seller_id, name, category, price, image_url) \
             SELECT $1, * FROM UNNEST($2::text[], $3::text[], $4::int8[], $5::text[])",
        )
        .bind(seller_id)
        .bind(&names)
        .bind(&categories)
        .bind(&prices)
        .bind(&image_urls)
        .execute(&mut *tx)
        .await?;
    }

    insert_seller_cells(&mut *tx, seller_id, &cells).await?;
    tx.commit().await?;

    tracing::info!(
        seller_id,
        items = items.len(),
        cells = cells.len(),
        "seller registered"
    );
    Ok(seller_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_query_places_scope_before_filters() {
        let sql = bundle_query("s.id = $3");
        let scope = sql.find("WHERE s.id = $3").unwrap();
        let category = sql.find("LOWER($2)").unwrap();
        assert!(scope < category);
        assert!(sql.contains("GROUP BY s.id"));
        assert!(sql.contains("ORDER BY i.created_at, i.id"));
    }

    #[test]
    fn bundle_query_matches_names_on_seller_or_item() {
        let sql = bundle_query("TRUE");
        assert!(sql.contains("STRPOS(LOWER(s.name), LOWER($1))"));
        assert!(sql.contains("STRPOS(LOWER(n.name), LOWER($1))"));
    }
}
