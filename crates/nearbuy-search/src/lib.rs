//! Nearby-seller search and delivery route optimization.
//!
//! - [`NearbySearchEngine`] expands hexagonal rings around a user until
//!   enough distinct sellers are found, then ranks them by distance.
//! - [`RouteOptimizer`] finds the exact shortest visiting order for a
//!   handful of stops between a fixed origin and destination.
//! - [`RoutePlanner`] resolves seller ids to stops and runs the optimizer.
//! - [`OrderEstimator`] validates a multi-seller order and prices it.

pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
mod fanout;
pub mod memory;
pub mod planner;
pub mod route;

pub use config::{EstimateConfig, RouteConfig, SearchConfig};
pub use engine::{NearbySearchEngine, NearbySeller, SearchPage};
pub use error::{EstimateError, RouteError, SearchError};
pub use estimate::{Estimate, OrderEstimator, OrderLine, OrderRequest, SellerOrder};
pub use memory::MemoryCatalog;
pub use planner::RoutePlanner;
pub use route::RouteOptimizer;
