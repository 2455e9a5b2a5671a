pub mod app_config;
pub mod catalog;
pub mod config;
pub mod model;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogStore, StoreError};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use model::{
    CatalogFilter, Item, RouteResult, SearchFilter, Seller, SellerBundle, Stop,
    DEFAULT_PAGE_LIMIT,
};
pub use nearbuy_geo::{Coordinate, GeoCell};
