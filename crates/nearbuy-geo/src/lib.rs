//! Geospatial primitives: coordinates, the hexagonal cell grid, and
//! great-circle distance.

pub mod coordinate;
pub mod distance;
pub mod error;
pub mod grid;

pub use coordinate::Coordinate;
pub use distance::{haversine_km, EARTH_RADIUS_KM};
pub use error::GeoError;
pub use grid::{disk_size, GeoCell, GeoGrid, H3Grid, MAX_RESOLUTION};
