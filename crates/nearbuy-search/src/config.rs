use std::time::Duration;

use nearbuy_core::AppConfig;

const DEFAULT_BASE_RESOLUTION: u8 = 8;
const DEFAULT_MAX_RING: u32 = 30;
const DEFAULT_MAX_CONCURRENT_CELLS: usize = 16;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;
const DEFAULT_MAX_STOPS: usize = 8;
const DEFAULT_MAX_SELLER_DISTANCE_M: f64 = 3_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub base_resolution: u8,
    pub max_ring: u32,
    pub max_concurrent_cells: usize,
    /// Checked between rings; `None` lets a search run to completion.
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_resolution: DEFAULT_BASE_RESOLUTION,
            max_ring: DEFAULT_MAX_RING,
            max_concurrent_cells: DEFAULT_MAX_CONCURRENT_CELLS,
            timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_resolution: config.search_base_resolution,
            max_ring: config.search_max_ring,
            max_concurrent_cells: config.search_max_concurrent_cells,
            timeout: (config.search_timeout_ms > 0)
                .then(|| Duration::from_millis(config.search_timeout_ms)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteConfig {
    pub average_speed_kmh: f64,
    /// Upper bound on intermediate stops; the optimizer is factorial in this.
    pub max_stops: usize,
    pub max_concurrent_lookups: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            max_stops: DEFAULT_MAX_STOPS,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_CELLS,
        }
    }
}

impl RouteConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            average_speed_kmh: config.route_average_speed_kmh,
            max_stops: config.route_max_stops,
            max_concurrent_lookups: config.search_max_concurrent_cells,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateConfig {
    /// Sellers at or beyond this distance from the user are rejected.
    pub max_seller_distance_m: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            max_seller_distance_m: DEFAULT_MAX_SELLER_DISTANCE_M,
        }
    }
}

impl EstimateConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_seller_distance_m: config.order_max_seller_distance_m,
        }
    }
}
