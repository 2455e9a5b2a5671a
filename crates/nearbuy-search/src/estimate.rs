//! Multi-seller order estimation.
//!
//! Validates an order before any routing happens: exactly one seller is the
//! pickup starting point, every seller lies within the delivery radius of the
//! user, and every line item is sold by its seller. The route starts at the
//! starting-point seller, visits the others, and ends at the user.

use std::sync::Arc;

use nearbuy_core::{RouteResult, SellerBundle, Stop};
use nearbuy_geo::{haversine_km, Coordinate};
use serde::{Deserialize, Serialize};

use crate::config::EstimateConfig;
use crate::error::EstimateError;
use crate::planner::{seller_stop, RoutePlanner};

const USER_LABEL: &str = "user";
const METERS_PER_KM: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrder {
    pub seller_id: i64,
    #[serde(default)]
    pub is_starting_point: bool,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_location: Coordinate,
    pub orders: Vec<SellerOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Sum of quantity × unit price over every line.
    pub total_price: i64,
    pub estimated_delivery_minutes: f64,
    pub route: RouteResult,
}

pub struct OrderEstimator {
    planner: Arc<RoutePlanner>,
    config: EstimateConfig,
}

impl OrderEstimator {
    #[must_use]
    pub fn new(planner: Arc<RoutePlanner>, config: EstimateConfig) -> Self {
        Self { planner, config }
    }

    /// Prices `request` and estimates its delivery time.
    ///
    /// # Errors
    ///
    /// Any [`EstimateError`] validation failure, or store and route errors
    /// raised while resolving sellers.
    pub async fn estimate(&self, request: &OrderRequest) -> Result<Estimate, EstimateError> {
        validate_shape(request)?;

        let seller_ids: Vec<i64> = request.orders.iter().map(|o| o.seller_id).collect();
        let bundles = self.planner.resolve_sellers(&seller_ids).await?;

        let mut total_price: i64 = 0;
        let mut origin: Option<Stop> = None;
        let mut stops: Vec<Stop> = Vec::with_capacity(bundles.len().saturating_sub(1));

        for (order, bundle) in request.orders.iter().zip(&bundles) {
            self.check_distance(request.user_location, bundle)?;
            total_price = total_price
                .checked_add(order_total(order, bundle)?)
                .ok_or(EstimateError::PriceOverflow)?;

            if order.is_starting_point {
                origin = Some(seller_stop(bundle));
            } else {
                stops.push(seller_stop(bundle));
            }
        }

        // validate_shape guarantees exactly one starting point.
        let origin = origin.ok_or(EstimateError::InvalidStartingPoint { count: 0 })?;
        let destination = Stop::new(USER_LABEL, request.user_location);
        let route = self.planner.plan(origin, destination, &stops)?;

        tracing::info!(
            sellers = request.orders.len(),
            total_price,
            estimated_minutes = route.estimated_minutes,
            "order estimated"
        );

        Ok(Estimate {
            total_price,
            estimated_delivery_minutes: route.estimated_minutes,
            route,
        })
    }

    fn check_distance(&self, user: Coordinate, bundle: &SellerBundle) -> Result<(), EstimateError> {
        let distance_m = haversine_km(user, bundle.seller.location) * METERS_PER_KM;
        if distance_m < self.config.max_seller_distance_m {
            Ok(())
        } else {
            Err(EstimateError::SellerTooFar {
                seller_id: bundle.seller.id,
                distance_m,
                max_m: self.config.max_seller_distance_m,
            })
        }
    }
}

fn validate_shape(request: &OrderRequest) -> Result<(), EstimateError> {
    if request.orders.is_empty() {
        return Err(EstimateError::NoOrders);
    }

    let count = request
        .orders
        .iter()
        .filter(|order| order.is_starting_point)
        .count();
    if count != 1 {
        return Err(EstimateError::InvalidStartingPoint { count });
    }

    if let Some(line) = request
        .orders
        .iter()
        .flat_map(|order| &order.items)
        .find(|line| line.quantity == 0)
    {
        return Err(EstimateError::InvalidQuantity {
            item_id: line.item_id,
        });
    }

    Ok(())
}

fn order_total(order: &SellerOrder, bundle: &SellerBundle) -> Result<i64, EstimateError> {
    order.items.iter().try_fold(0_i64, |acc, line| {
        let item = bundle.item(line.item_id).ok_or(EstimateError::ItemNotFound {
            seller_id: order.seller_id,
            item_id: line.item_id,
        })?;
        item.price
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| acc.checked_add(line_total))
            .ok_or(EstimateError::PriceOverflow)
    })
}

#[cfg(test)]
#[path = "estimate_test.rs"]
mod tests;
