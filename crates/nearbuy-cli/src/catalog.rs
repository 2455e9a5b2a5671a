//! Catalog maintenance commands: seller registration and cell backfill.

use nearbuy_db::{NewItem, NewSeller};
use nearbuy_geo::H3Grid;

/// Register one seller and print its new id.
///
/// # Errors
///
/// Returns an error if the location is invalid or any insert fails.
pub(crate) async fn run_register_seller(
    pool: &sqlx::PgPool,
    seller: &NewSeller,
    items: &[NewItem],
) -> anyhow::Result<()> {
    let seller_id = nearbuy_db::insert_seller(pool, &H3Grid::new(), seller, items).await?;
    println!(
        "registered seller {seller_id} ({}) with {} item(s) at {}",
        seller.name,
        items.len(),
        seller.location
    );
    Ok(())
}

/// Index every seller that has no grid cell rows yet.
///
/// # Errors
///
/// Returns an error if a query fails or a stored location is invalid.
pub(crate) async fn run_index_cells(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let indexed = nearbuy_db::index_missing_cells(pool, &H3Grid::new()).await?;
    if indexed == 0 {
        println!("all sellers already indexed");
    } else {
        println!("indexed {indexed} seller(s)");
    }
    Ok(())
}
