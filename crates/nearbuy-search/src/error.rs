use nearbuy_core::StoreError;
use nearbuy_geo::GeoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Grid(#[from] GeoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("limit must be greater than zero")]
    InvalidLimit,

    #[error("search deadline exceeded after {rings_searched} rings")]
    DeadlineExceeded { rings_searched: u32 },
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("route has {requested} stops; at most {max} are supported")]
    TooManyStops { requested: usize, max: usize },

    #[error("seller {0} appears more than once in the route")]
    DuplicateStop(i64),
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("order must contain at least one seller")]
    NoOrders,

    #[error("exactly one seller must be the starting point, found {count}")]
    InvalidStartingPoint { count: usize },

    #[error("item {item_id} has non-positive quantity")]
    InvalidQuantity { item_id: i64 },

    #[error("seller {seller_id} is {distance_m:.0} m away; the limit is {max_m:.0} m")]
    SellerTooFar {
        seller_id: i64,
        distance_m: f64,
        max_m: f64,
    },

    #[error("item {item_id} is not sold by seller {seller_id}")]
    ItemNotFound { seller_id: i64, item_id: i64 },

    #[error("order total overflows")]
    PriceOverflow,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Route(#[from] RouteError),
}
