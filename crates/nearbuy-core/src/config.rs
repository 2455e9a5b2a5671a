use nearbuy_geo::MAX_RESOLUTION;
use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.into(),
    }
}

fn parse_with<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(var, e.to_string()))
}

/// Core parsing/validation logic, decoupled from the process environment so
/// tests can drive it with a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("NEARBUY_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_with(
        "NEARBUY_BIND_ADDR",
        &or_default("NEARBUY_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("NEARBUY_LOG_LEVEL", "info");

    let db_max_connections: u32 = parse_with(
        "NEARBUY_DB_MAX_CONNECTIONS",
        &or_default("NEARBUY_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_with(
        "NEARBUY_DB_MIN_CONNECTIONS",
        &or_default("NEARBUY_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_with(
        "NEARBUY_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("NEARBUY_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let search_base_resolution: u8 = parse_with(
        "NEARBUY_SEARCH_BASE_RESOLUTION",
        &or_default("NEARBUY_SEARCH_BASE_RESOLUTION", "8"),
    )?;
    if search_base_resolution > MAX_RESOLUTION {
        return Err(invalid(
            "NEARBUY_SEARCH_BASE_RESOLUTION",
            format!("must be between 0 and {MAX_RESOLUTION}, got {search_base_resolution}"),
        ));
    }

    let search_max_ring: u32 = parse_with(
        "NEARBUY_SEARCH_MAX_RING",
        &or_default("NEARBUY_SEARCH_MAX_RING", "30"),
    )?;
    if search_max_ring == 0 {
        return Err(invalid("NEARBUY_SEARCH_MAX_RING", "must be at least 1"));
    }

    let search_max_concurrent_cells: usize = parse_with(
        "NEARBUY_SEARCH_MAX_CONCURRENT_CELLS",
        &or_default("NEARBUY_SEARCH_MAX_CONCURRENT_CELLS", "16"),
    )?;
    let search_timeout_ms: u64 = parse_with(
        "NEARBUY_SEARCH_TIMEOUT_MS",
        &or_default("NEARBUY_SEARCH_TIMEOUT_MS", "5000"),
    )?;

    let route_average_speed_kmh: f64 = parse_with(
        "NEARBUY_ROUTE_AVERAGE_SPEED_KMH",
        &or_default("NEARBUY_ROUTE_AVERAGE_SPEED_KMH", "40"),
    )?;
    if !(route_average_speed_kmh.is_finite() && route_average_speed_kmh > 0.0) {
        return Err(invalid(
            "NEARBUY_ROUTE_AVERAGE_SPEED_KMH",
            "must be a positive number",
        ));
    }

    let route_max_stops: usize = parse_with(
        "NEARBUY_ROUTE_MAX_STOPS",
        &or_default("NEARBUY_ROUTE_MAX_STOPS", "8"),
    )?;

    let order_max_seller_distance_m: f64 = parse_with(
        "NEARBUY_ORDER_MAX_SELLER_DISTANCE_M",
        &or_default("NEARBUY_ORDER_MAX_SELLER_DISTANCE_M", "3000"),
    )?;
    if !(order_max_seller_distance_m.is_finite() && order_max_seller_distance_m > 0.0) {
        return Err(invalid(
            "NEARBUY_ORDER_MAX_SELLER_DISTANCE_M",
            "must be a positive number",
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_base_resolution,
        search_max_ring,
        search_max_concurrent_cells,
        search_timeout_ms,
        route_average_speed_kmh,
        route_max_stops,
        order_max_seller_distance_m,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "NEARBUY_ENV",
            format!("unknown environment \"{other}\""),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
