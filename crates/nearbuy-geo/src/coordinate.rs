use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GeoError;

/// A WGS84 point in decimal degrees.
///
/// No normalization is performed on construction. Use [`Coordinate::validate`]
/// at input boundaries to reject out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Checks that both components are finite and inside the WGS84 ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] describing the offending component.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.long.is_finite() || !(-180.0..=180.0).contains(&self.long) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.long
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.long)
    }
}

/// Parses `"lat,long"`. Whitespace anywhere in the input is ignored and any
/// components past the second are dropped. Range checks are left to
/// [`Coordinate::validate`].
impl FromStr for Coordinate {
    type Err = GeoError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parts = compact.split(',');

        let (Some(lat), Some(long)) = (parts.next(), parts.next()) else {
            return Err(GeoError::InvalidCoordinate(format!(
                "expected \"lat,long\", got \"{raw}\""
            )));
        };

        let lat = lat
            .parse::<f64>()
            .map_err(|e| GeoError::InvalidCoordinate(format!("latitude \"{lat}\": {e}")))?;
        let long = long
            .parse::<f64>()
            .map_err(|e| GeoError::InvalidCoordinate(format!("longitude \"{long}\": {e}")))?;

        Ok(Self { lat, long })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_long_pair() {
        let c: Coordinate = "-6.2088,106.8456".parse().unwrap();
        assert_eq!(c, Coordinate::new(-6.2088, 106.8456));
    }

    #[test]
    fn parse_ignores_whitespace() {
        let c: Coordinate = " 40.7128 , -74.0060 ".parse().unwrap();
        assert_eq!(c, Coordinate::new(40.7128, -74.006));
    }

    #[test]
    fn parse_rejects_single_component() {
        let err = "40.7128".parse::<Coordinate>().unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(_)));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!("north,-74.0".parse::<Coordinate>().is_err());
        assert!("40.0,west".parse::<Coordinate>().is_err());
    }

    #[test]
    fn parse_keeps_out_of_range_values() {
        let c: Coordinate = "91,0".parse().unwrap();
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(-90.0, -180.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(-90.5, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, 180.01).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn serializes_with_lat_long_keys() {
        let json = serde_json::to_string(&Coordinate::new(1.5, 2.5)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"long":2.5}"#);
    }
}
