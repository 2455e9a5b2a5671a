//! Read-only search and routing commands.

use std::sync::Arc;

use nearbuy_core::{AppConfig, SearchFilter};
use nearbuy_db::PgCatalog;
use nearbuy_geo::{Coordinate, H3Grid};
use nearbuy_search::{NearbySearchEngine, RouteConfig, RoutePlanner, SearchConfig};

/// Run a nearby search and print the page as a table.
///
/// # Errors
///
/// Returns an error if the search fails.
pub(crate) async fn run_nearby(
    pool: sqlx::PgPool,
    config: &AppConfig,
    location: Coordinate,
    filter: &SearchFilter,
) -> anyhow::Result<()> {
    let engine = NearbySearchEngine::new(
        Arc::new(H3Grid::new()),
        Arc::new(PgCatalog::new(pool)),
        SearchConfig::from_app_config(config),
    );
    let page = engine.find_nearby(location, filter).await?;

    if page.sellers.is_empty() {
        println!("no sellers found near {location} (total {})", page.total);
        return Ok(());
    }

    println!("{:<8}{:<11}{:<20}{:<6}NAME", "ID", "KM", "CATEGORY", "ITEMS");
    for nearby in &page.sellers {
        let seller = &nearby.bundle.seller;
        println!(
            "{:<8}{:<11.3}{:<20}{:<6}{}",
            seller.id,
            nearby.distance_km,
            seller.category,
            nearby.bundle.items.len(),
            seller.name
        );
    }
    println!(
        "showing {} of {} (offset {})",
        page.sellers.len(),
        page.total,
        filter.offset
    );

    Ok(())
}

/// Compute and print the shortest route through `seller_ids`.
///
/// # Errors
///
/// Returns an error if a seller cannot be resolved or the stop limit is exceeded.
pub(crate) async fn run_route(
    pool: sqlx::PgPool,
    config: &AppConfig,
    origin: Coordinate,
    destination: Coordinate,
    seller_ids: &[i64],
) -> anyhow::Result<()> {
    let planner = RoutePlanner::new(
        Arc::new(PgCatalog::new(pool)),
        RouteConfig::from_app_config(config),
    );
    let route = planner
        .find_optimal_route(origin, destination, seller_ids)
        .await?;

    for (position, label) in route.ordered_labels.iter().enumerate() {
        println!("{:>3}. {label}", position + 1);
    }
    println!(
        "total {:.3} km, about {:.1} min",
        route.total_distance_km, route.estimated_minutes
    );

    Ok(())
}
