use std::collections::HashSet;
use std::sync::Arc;

use nearbuy_core::{CatalogStore, RouteResult, SellerBundle, Stop};
use nearbuy_geo::Coordinate;

use crate::config::RouteConfig;
use crate::error::RouteError;
use crate::fanout::fan_out;
use crate::route::RouteOptimizer;

pub const ORIGIN_LABEL: &str = "origin";
pub const DESTINATION_LABEL: &str = "destination";

/// Resolves sellers to stops and runs the [`RouteOptimizer`] over them.
pub struct RoutePlanner {
    store: Arc<dyn CatalogStore>,
    optimizer: RouteOptimizer,
    config: RouteConfig,
}

impl RoutePlanner {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, config: RouteConfig) -> Self {
        Self {
            store,
            optimizer: RouteOptimizer::new(config.average_speed_kmh),
            config,
        }
    }

    #[must_use]
    pub fn optimizer(&self) -> &RouteOptimizer {
        &self.optimizer
    }

    /// Shortest route from `origin` through every seller in `seller_ids` to
    /// `destination`. Sellers are labelled by name.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TooManyStops`] above the configured stop limit.
    /// - [`RouteError::DuplicateStop`] if a seller id is repeated.
    /// - [`RouteError::Store`] if any seller fails to resolve; no partial
    ///   route is returned.
    pub async fn find_optimal_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        seller_ids: &[i64],
    ) -> Result<RouteResult, RouteError> {
        self.check_stop_count(seller_ids.len())?;

        let mut seen = HashSet::with_capacity(seller_ids.len());
        if let Some(&dup) = seller_ids.iter().find(|&&id| !seen.insert(id)) {
            return Err(RouteError::DuplicateStop(dup));
        }

        let bundles = self.resolve_sellers(seller_ids).await?;
        let stops: Vec<Stop> = bundles.iter().map(seller_stop).collect();

        self.plan(
            Stop::new(ORIGIN_LABEL, origin),
            Stop::new(DESTINATION_LABEL, destination),
            &stops,
        )
    }

    /// Runs the optimizer over already-resolved stops.
    ///
    /// # Errors
    ///
    /// [`RouteError::TooManyStops`] above the configured stop limit.
    pub fn plan(
        &self,
        origin: Stop,
        destination: Stop,
        stops: &[Stop],
    ) -> Result<RouteResult, RouteError> {
        self.check_stop_count(stops.len())?;
        let result = self.optimizer.solve(&origin, &destination, stops);
        tracing::debug!(
            stops = stops.len(),
            total_distance_km = result.total_distance_km,
            estimated_minutes = result.estimated_minutes,
            "route optimized"
        );
        Ok(result)
    }

    /// Fetches every seller concurrently, in the order given.
    ///
    /// # Errors
    ///
    /// The first store error in input order, after all lookups have finished.
    pub async fn resolve_sellers(&self, seller_ids: &[i64]) -> Result<Vec<SellerBundle>, RouteError> {
        let store = &self.store;
        let bundles = fan_out(
            seller_ids.iter().copied(),
            self.config.max_concurrent_lookups,
            |seller_id| async move { store.get_by_id(seller_id).await },
        )
        .await?;
        Ok(bundles)
    }

    fn check_stop_count(&self, requested: usize) -> Result<(), RouteError> {
        if requested > self.config.max_stops {
            return Err(RouteError::TooManyStops {
                requested,
                max: self.config.max_stops,
            });
        }
        Ok(())
    }
}

pub(crate) fn seller_stop(bundle: &SellerBundle) -> Stop {
    Stop::new(bundle.seller.name.clone(), bundle.seller.location)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use nearbuy_core::{Seller, StoreError};
    use nearbuy_geo::{haversine_km, H3Grid};

    use super::*;
    use crate::memory::MemoryCatalog;

    fn seller(id: i64, name: &str, lat: f64, long: f64) -> SellerBundle {
        SellerBundle {
            seller: Seller {
                id,
                name: name.to_string(),
                category: "SmallRestaurant".to_string(),
                image_url: format!("https://img.example/{id}.jpg"),
                location: Coordinate::new(lat, long),
                created_at: Utc::now(),
            },
            items: Vec::new(),
        }
    }

    fn planner_with(bundles: Vec<SellerBundle>, config: RouteConfig) -> (RoutePlanner, Arc<MemoryCatalog>) {
        let catalog = MemoryCatalog::new(&H3Grid::new(), bundles)
            .unwrap()
            .into_shared();
        let planner = RoutePlanner::new(catalog.clone(), config);
        (planner, catalog)
    }

    fn sample_sellers() -> Vec<SellerBundle> {
        vec![
            seller(1, "Sate Padang", -6.2000, 106.8400),
            seller(2, "Kopi Kenangan", -6.2100, 106.8500),
            seller(3, "Bakso Pak Kumis", -6.1900, 106.8300),
        ]
    }

    #[tokio::test]
    async fn resolves_sellers_and_labels_the_route() {
        let (planner, catalog) = planner_with(sample_sellers(), RouteConfig::default());
        let origin = Coordinate::new(-6.1800, 106.8200);
        let destination = Coordinate::new(-6.2200, 106.8600);

        let route = planner
            .find_optimal_route(origin, destination, &[1, 2, 3])
            .await
            .unwrap();

        assert_eq!(route.ordered_labels.len(), 5);
        assert_eq!(route.ordered_labels[0], ORIGIN_LABEL);
        assert_eq!(route.ordered_labels[4], DESTINATION_LABEL);
        for name in ["Sate Padang", "Kopi Kenangan", "Bakso Pak Kumis"] {
            assert!(route.ordered_labels.iter().any(|l| l == name), "{name}");
        }
        assert_eq!(catalog.id_lookups(), 3);
        assert!(route.estimated_minutes > 0.0);
    }

    #[tokio::test]
    async fn no_sellers_is_the_direct_route() {
        let (planner, _) = planner_with(sample_sellers(), RouteConfig::default());
        let origin = Coordinate::new(-6.18, 106.82);
        let destination = Coordinate::new(-6.22, 106.86);

        let route = planner
            .find_optimal_route(origin, destination, &[])
            .await
            .unwrap();

        assert_eq!(route.total_distance_km, haversine_km(origin, destination));
    }

    #[tokio::test]
    async fn unknown_seller_aborts_the_whole_route() {
        let (planner, catalog) = planner_with(sample_sellers(), RouteConfig::default());

        let err = planner
            .find_optimal_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.1), &[1, 99, 2])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RouteError::Store(StoreError::NotFound { seller_id: 99 })
        ));
        assert_eq!(catalog.id_lookups(), 3, "sibling lookups still complete");
    }

    #[tokio::test]
    async fn too_many_stops_is_rejected_before_lookup() {
        let config = RouteConfig {
            max_stops: 2,
            ..RouteConfig::default()
        };
        let (planner, catalog) = planner_with(sample_sellers(), config);

        let err = planner
            .find_optimal_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.1), &[1, 2, 3])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RouteError::TooManyStops {
                requested: 3,
                max: 2
            }
        ));
        assert_eq!(catalog.id_lookups(), 0);
    }

    #[tokio::test]
    async fn duplicate_seller_is_rejected() {
        let (planner, _) = planner_with(sample_sellers(), RouteConfig::default());

        let err = planner
            .find_optimal_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.1), &[2, 1, 2])
            .await
            .unwrap_err();

        assert!(matches!(err, RouteError::DuplicateStop(2)));
    }

    #[tokio::test]
    async fn resolve_sellers_keeps_request_order() {
        let (planner, _) = planner_with(sample_sellers(), RouteConfig::default());
        let bundles = planner.resolve_sellers(&[3, 1, 2]).await.unwrap();
        let ids: Vec<i64> = bundles.iter().map(|b| b.seller.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
