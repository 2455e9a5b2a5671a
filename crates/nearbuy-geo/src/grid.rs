//! Hierarchical hexagonal grid.
//!
//! [`GeoGrid`] is the two-method capability the search engine depends on:
//! locate the cell containing a point, and enumerate the filled disk of cells
//! around it. [`H3Grid`] backs it with the H3 index via `h3o`.

use h3o::{CellIndex, LatLng, Resolution};

use crate::{Coordinate, GeoError};

/// Finest resolution the grid supports. Resolution 0 is the coarsest.
pub const MAX_RESOLUTION: u8 = 15;

/// An opaque grid cell. Only produced by a [`GeoGrid`].
///
/// Two cells denote the same region only when both `id` and `resolution`
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoCell {
    id: i64,
    resolution: u8,
}

impl GeoCell {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn resolution(&self) -> u8 {
        self.resolution
    }
}

impl From<CellIndex> for GeoCell {
    #[allow(clippy::cast_possible_wrap)]
    fn from(cell: CellIndex) -> Self {
        // H3 indexes always leave the high bit clear.
        Self {
            id: u64::from(cell) as i64,
            resolution: u8::from(cell.resolution()),
        }
    }
}

/// Number of cells in a filled hexagonal disk of radius `k`: `3k² + 3k + 1`.
#[must_use]
pub fn disk_size(k: u32) -> usize {
    let k = k as usize;
    3 * k * k + 3 * k + 1
}

pub trait GeoGrid: Send + Sync {
    /// Returns the cell containing `coord` at `resolution`.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidResolution`] when `resolution > 15`,
    /// [`GeoError::InvalidCoordinate`] for non-finite input.
    fn cell_at(&self, coord: Coordinate, resolution: u8) -> Result<GeoCell, GeoError>;

    /// Returns every cell within `k` grid steps of the cell containing
    /// `center`, the center included. `k = 0` yields the center alone.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GeoGrid::cell_at`].
    fn ring(&self, center: Coordinate, resolution: u8, k: u32) -> Result<Vec<GeoCell>, GeoError>;

    /// Returns the cells containing `coord` at every resolution, coarsest first.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GeoGrid::cell_at`].
    fn cell_path(&self, coord: Coordinate) -> Result<Vec<GeoCell>, GeoError> {
        (0..=MAX_RESOLUTION)
            .map(|resolution| self.cell_at(coord, resolution))
            .collect()
    }
}

/// [`GeoGrid`] over Uber's H3 index.
///
/// Disks near one of the twelve pentagons hold fewer cells than
/// [`disk_size`] predicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl H3Grid {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn locate(coord: Coordinate, resolution: u8) -> Result<CellIndex, GeoError> {
        let resolution =
            Resolution::try_from(resolution).map_err(|_| GeoError::InvalidResolution(resolution))?;
        let latlng = LatLng::new(coord.lat, coord.long)
            .map_err(|e| GeoError::InvalidCoordinate(format!("{coord}: {e}")))?;
        Ok(latlng.to_cell(resolution))
    }
}

impl GeoGrid for H3Grid {
    fn cell_at(&self, coord: Coordinate, resolution: u8) -> Result<GeoCell, GeoError> {
        Self::locate(coord, resolution).map(GeoCell::from)
    }

    fn ring(&self, center: Coordinate, resolution: u8, k: u32) -> Result<Vec<GeoCell>, GeoError> {
        let origin = Self::locate(center, resolution)?;
        let disk: Vec<CellIndex> = origin.grid_disk(k);
        Ok(disk.into_iter().map(GeoCell::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const JAKARTA: Coordinate = Coordinate::new(-6.2088, 106.8456);

    fn ids(cells: &[GeoCell]) -> HashSet<i64> {
        cells.iter().map(GeoCell::id).collect()
    }

    #[test]
    fn disk_size_follows_hexagonal_packing() {
        assert_eq!(disk_size(0), 1);
        assert_eq!(disk_size(1), 7);
        assert_eq!(disk_size(2), 19);
        assert_eq!(disk_size(10), 331);
    }

    #[test]
    fn ring_zero_is_the_center_cell_at_every_resolution() {
        let grid = H3Grid::new();
        for resolution in 0..=MAX_RESOLUTION {
            let cells = grid.ring(JAKARTA, resolution, 0).unwrap();
            assert_eq!(cells.len(), 1, "resolution {resolution}");
            assert_eq!(cells[0], grid.cell_at(JAKARTA, resolution).unwrap());
        }
    }

    #[test]
    fn ring_size_matches_disk_formula() {
        let grid = H3Grid::new();
        for k in [1, 2, 3, 5, 10] {
            let cells = grid.ring(JAKARTA, 8, k).unwrap();
            assert_eq!(cells.len(), disk_size(k), "k = {k}");
            assert_eq!(ids(&cells).len(), cells.len(), "duplicate cells at k = {k}");
        }
    }

    #[test]
    fn ring_is_deterministic() {
        let grid = H3Grid::new();
        let first = grid.ring(JAKARTA, 9, 4).unwrap();
        let second = grid.ring(JAKARTA, 9, 4).unwrap();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn ring_grows_as_superset_of_previous_k() {
        let grid = H3Grid::new();
        let mut previous = ids(&grid.ring(JAKARTA, 8, 0).unwrap());
        for k in 1..=6 {
            let current = ids(&grid.ring(JAKARTA, 8, k).unwrap());
            assert!(current.len() > previous.len(), "k = {k}");
            assert!(current.is_superset(&previous), "k = {k}");
            previous = current;
        }
    }

    #[test]
    fn ring_cells_share_the_requested_resolution() {
        let grid = H3Grid::new();
        let cells = grid.ring(JAKARTA, 11, 2).unwrap();
        assert!(cells.iter().all(|c| c.resolution() == 11));
    }

    #[test]
    fn interior_cell_has_six_neighbors() {
        let grid = H3Grid::new();
        let center = grid.cell_at(JAKARTA, 8).unwrap();
        let neighbors: Vec<_> = grid
            .ring(JAKARTA, 8, 1)
            .unwrap()
            .into_iter()
            .filter(|c| *c != center)
            .collect();
        assert_eq!(neighbors.len(), 6);
    }

    #[test]
    fn cell_at_is_stable_and_separates_distant_points() {
        let grid = H3Grid::new();
        let a = grid.cell_at(JAKARTA, 8).unwrap();
        let b = grid.cell_at(JAKARTA, 8).unwrap();
        let far = grid.cell_at(Coordinate::new(40.7128, -74.0060), 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.id(), far.id());
        assert_ne!(a.id(), 0);
    }

    #[test]
    fn invalid_resolution_is_rejected() {
        let grid = H3Grid::new();
        assert_eq!(
            grid.cell_at(JAKARTA, 16).unwrap_err(),
            GeoError::InvalidResolution(16)
        );
        assert_eq!(
            grid.ring(JAKARTA, 42, 1).unwrap_err(),
            GeoError::InvalidResolution(42)
        );
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let grid = H3Grid::new();
        let err = grid.cell_at(Coordinate::new(f64::NAN, 0.0), 8).unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(_)));
    }

    #[test]
    fn extreme_coordinates_resolve() {
        let grid = H3Grid::new();
        for coord in [
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 0.0),
            Coordinate::new(0.0, 180.0),
            Coordinate::new(0.0, -180.0),
        ] {
            assert_eq!(grid.cell_path(coord).unwrap().len(), 16, "{coord}");
        }
    }

    #[test]
    fn cell_path_nests_each_resolution_inside_the_previous() {
        let grid = H3Grid::new();
        let path = grid.cell_path(Coordinate::new(37.7749, -122.4194)).unwrap();
        assert_eq!(path.len(), usize::from(MAX_RESOLUTION) + 1);

        for pair in path.windows(2) {
            let parent = pair[0];
            let child = CellIndex::try_from(u64::try_from(pair[1].id()).unwrap()).unwrap();
            let resolution = Resolution::try_from(parent.resolution()).unwrap();
            let expected = child.parent(resolution).map(GeoCell::from);
            assert_eq!(expected, Some(parent));
        }
    }
}
