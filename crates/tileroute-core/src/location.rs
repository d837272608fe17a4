//! A position on a specific layer.

use std::fmt;

use crate::geom::{ExactModelCoordinate, ModelCoordinate};
use crate::grids::CellGrid;
use crate::layer::LayerId;

/// A layer plus a continuous position on it, in exact layer coordinates.
///
/// The cell a location falls into depends on the layer's grid; use
/// [`Location::cell`] when the grid is at hand, or
/// [`Location::layer_coordinates`] for positions known to sit on a cell
/// centre.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    layer: LayerId,
    exact: ExactModelCoordinate,
}

impl Location {
    /// A location at the centre of `cell`.
    pub fn new(layer: LayerId, cell: ModelCoordinate) -> Self {
        Self {
            layer,
            exact: cell.into(),
        }
    }

    pub fn from_exact(layer: LayerId, exact: ExactModelCoordinate) -> Self {
        Self { layer, exact }
    }

    #[inline]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn set_layer(&mut self, layer: LayerId) {
        self.layer = layer;
    }

    /// The position rounded to the nearest integer coordinate.
    #[inline]
    pub fn layer_coordinates(&self) -> ModelCoordinate {
        self.exact.round()
    }

    #[inline]
    pub fn exact_layer_coordinates(&self) -> ExactModelCoordinate {
        self.exact
    }

    /// Move to the centre of `cell`.
    pub fn set_layer_coordinates(&mut self, cell: ModelCoordinate) {
        self.exact = cell.into();
    }

    pub fn set_exact_layer_coordinates(&mut self, exact: ExactModelCoordinate) {
        self.exact = exact;
    }

    /// The cell containing this position on `grid`.
    pub fn cell(&self, grid: &dyn CellGrid) -> ModelCoordinate {
        grid.to_layer_coordinates(grid.to_map_coordinates(self.exact))
    }

    /// The position in map space.
    pub fn map_coordinates(&self, grid: &dyn CellGrid) -> ExactModelCoordinate {
        grid.to_map_coordinates(self.exact)
    }

    pub fn set_map_coordinates(&mut self, grid: &dyn CellGrid, map_coords: ExactModelCoordinate) {
        self.exact = grid.to_exact_layer_coordinates(map_coords);
    }

    /// Straight-line distance between the integer coordinates of two
    /// locations, ignoring their layers and elevation.
    pub fn layer_distance_to(&self, other: &Location) -> f64 {
        let a = self.layer_coordinates();
        let b = other.layer_coordinates();
        let dx = f64::from(a.x - b.x);
        let dy = f64::from(a.y - b.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer, self.exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::{GridTransform, HexGrid, SquareGrid};

    #[test]
    fn cell_and_rounding() {
        let mut loc = Location::new(LayerId(0), ModelCoordinate::new(3, 4));
        assert_eq!(loc.layer_coordinates(), ModelCoordinate::new(3, 4));
        loc.set_exact_layer_coordinates(ExactModelCoordinate::new(3.4, 4.6));
        assert_eq!(loc.layer_coordinates(), ModelCoordinate::new(3, 5));
        assert_eq!(loc.cell(&SquareGrid::new(false)), ModelCoordinate::new(3, 5));
    }

    #[test]
    fn map_coordinates_follow_the_grid() {
        let t = GridTransform::from_parts(0.0, 10.0, 10.0, 0.0, 0.0, 0.0).unwrap();
        let grid = SquareGrid::with_transform(false, t);
        let mut loc = Location::new(LayerId(1), ModelCoordinate::new(2, 3));
        let map = loc.map_coordinates(&grid);
        assert!(map.approx_eq(ExactModelCoordinate::new(20.0, 30.0), 1e-9));

        loc.set_map_coordinates(&grid, ExactModelCoordinate::new(55.0, 5.0));
        assert!(loc.exact_layer_coordinates().approx_eq(ExactModelCoordinate::new(5.5, 0.5), 1e-9));
    }

    #[test]
    fn hex_cell_lookup() {
        let grid = HexGrid::new();
        let loc = Location::new(LayerId(0), ModelCoordinate::new(2, 1));
        assert_eq!(loc.cell(&grid), ModelCoordinate::new(2, 1));
    }

    #[test]
    fn layer_distance() {
        let a = Location::new(LayerId(0), ModelCoordinate::new(0, 0));
        let b = Location::new(LayerId(2), ModelCoordinate::new(3, 4));
        assert_eq!(a.layer_distance_to(&b), 5.0);
        assert_eq!(b.layer_distance_to(&a), 5.0);
    }
}
