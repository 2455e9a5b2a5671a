//! Database operations for the `seller_cells` index table.

use nearbuy_geo::{Coordinate, GeoCell, GeoGrid};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// Writes one index row per cell for `seller_id`. Existing rows are kept.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails.
pub async fn insert_seller_cells(
    conn: &mut PgConnection,
    seller_id: i64,
    cells: &[GeoCell],
) -> Result<u64, sqlx::Error> {
    if cells.is_empty() {
        return Ok(0);
    }

    let h3_indexes: Vec<i64> = cells.iter().map(|c| c.id()).collect();
    let resolutions: Vec<i16> = cells.iter().map(|c| i16::from(c.resolution())).collect();

    let result = sqlx::query(
        "INSERT INTO seller_cells (seller_id, h3_index, resolution) \
         SELECT $1, * FROM UNNEST($2::int8[], $3::int2[]) \
         ON CONFLICT (seller_id, resolution) DO NOTHING",
    )
    .bind(seller_id)
    .bind(&h3_indexes)
    .bind(&resolutions)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

#[derive(sqlx::FromRow)]
struct UnindexedSeller {
    id: i64,
    latitude: f64,
    longitude: f64,
}

/// Computes and stores cell rows for every seller that has none.
///
/// Returns the number of sellers indexed.
///
/// # Errors
///
/// Returns [`DbError::Geo`] if a stored location cannot be placed on the
/// grid, or [`DbError::Sqlx`] if a query fails. Rows for sellers processed
/// before the failure are kept.
pub async fn index_missing_cells(pool: &PgPool, grid: &dyn GeoGrid) -> Result<u64, DbError> {
    let sellers = sqlx::query_as::<_, UnindexedSeller>(
        "SELECT s.id, s.latitude, s.longitude \
         FROM sellers s \
         WHERE NOT EXISTS (SELECT 1 FROM seller_cells sc WHERE sc.seller_id = s.id) \
         ORDER BY s.id",
    )
    .fetch_all(pool)
    .await?;

    let mut indexed = 0_u64;
    for seller in &sellers {
        let cells = grid.cell_path(Coordinate::new(seller.latitude, seller.longitude))?;
        let mut conn = pool.acquire().await?;
        insert_seller_cells(&mut *conn, seller.id, &cells).await?;
        indexed += 1;
    }

    tracing::info!(indexed, "seller cells backfilled");
    Ok(indexed)
}
