use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Grid resolution the nearby search expands rings at (0..=15).
    pub search_base_resolution: u8,
    /// Largest ring radius tried before falling back to a full catalog scan.
    pub search_max_ring: u32,
    pub search_max_concurrent_cells: usize,
    /// Deadline for one search, checked between rings. `0` disables it.
    pub search_timeout_ms: u64,
    pub route_average_speed_kmh: f64,
    pub route_max_stops: usize,
    pub order_max_seller_distance_m: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("search_base_resolution", &self.search_base_resolution)
            .field("search_max_ring", &self.search_max_ring)
            .field(
                "search_max_concurrent_cells",
                &self.search_max_concurrent_cells,
            )
            .field("search_timeout_ms", &self.search_timeout_ms)
            .field("route_average_speed_kmh", &self.route_average_speed_kmh)
            .field("route_max_stops", &self.route_max_stops)
            .field(
                "order_max_seller_distance_m",
                &self.order_max_seller_distance_m,
            )
            .finish()
    }
}
