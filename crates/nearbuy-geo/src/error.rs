use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid resolution {0}: must be between 0 and 15")]
    InvalidResolution(u8),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid cell id {0}")]
    InvalidCell(i64),
}
