//! Cell grid geometry.
//!
//! A [`CellGrid`] maps between layer coordinates (cell addresses) and
//! continuous map coordinates, and defines which cells are adjacent and what
//! stepping between them costs. Two tilings are provided:
//!
//! | Grid | Type name | Neighbours | Step cost |
//! |---|---|---|---|
//! | [`SquareGrid`] | `"square"` | 4, or 8 with diagonals | 1.0 / 1.4142 |
//! | [`HexGrid`] | `"hexagonal"` | 6 | 1.0 |

use std::fmt;

use crate::error::GridError;
use crate::geom::{ExactModelCoordinate, ModelCoordinate};

mod hex;
mod square;
mod transform;

pub use hex::HexGrid;
pub use square::SquareGrid;
pub use transform::GridTransform;

/// Type name of [`SquareGrid`].
pub const SQUARE_GRID_TYPE: &str = "square";
/// Type name of [`HexGrid`].
pub const HEX_GRID_TYPE: &str = "hexagonal";

/// Geometry and topology of a tiling.
///
/// Grids are configuration only: they hold no per-search state and are
/// read-only while a search runs.
pub trait CellGrid: fmt::Debug {
    /// Type name used to pick a matching heuristic (`"square"`, `"hexagonal"`).
    fn grid_type(&self) -> &'static str;

    /// Human readable name.
    fn name(&self) -> &'static str;

    /// Number of sides of one cell.
    fn cell_side_count(&self) -> u32;

    fn transform(&self) -> &GridTransform;

    fn transform_mut(&mut self) -> &mut GridTransform;

    /// Whether `target` is a supported neighbour of `cur`.
    fn is_accessible(&self, cur: ModelCoordinate, target: ModelCoordinate) -> bool;

    /// Cost of stepping from `cur` to the adjacent `target`; zero when they
    /// are the same cell.
    fn adjacent_cost(&self, cur: ModelCoordinate, target: ModelCoordinate) -> f64;

    /// Layer space to map space.
    fn to_map_coordinates(&self, layer_coords: ExactModelCoordinate) -> ExactModelCoordinate;

    /// Map space to the cell containing the point.
    fn to_layer_coordinates(&self, map_coords: ExactModelCoordinate) -> ModelCoordinate;

    /// Map space to continuous layer space.
    fn to_exact_layer_coordinates(&self, map_coords: ExactModelCoordinate)
    -> ExactModelCoordinate;

    /// Polygon bounding `cell`, in exact layer coordinates.
    fn vertices(&self, cell: ModelCoordinate) -> Vec<ExactModelCoordinate>;

    /// Cells crossed by a line from `start` to `end`, both included.
    fn coordinates_in_line(
        &self,
        start: ModelCoordinate,
        end: ModelCoordinate,
    ) -> Vec<ModelCoordinate>;

    /// Anchor relative offsets at `position`. With `reverse` the offsets are
    /// subtracted instead of added.
    fn to_multi_coordinates(
        &self,
        position: ModelCoordinate,
        orig: &[ModelCoordinate],
        reverse: bool,
    ) -> Vec<ModelCoordinate>;

    /// A new grid with the same configuration.
    fn clone_grid(&self) -> Box<dyn CellGrid>;

    /// Fill `buf` with every coordinate accessible from `cur`, scanning
    /// columns left to right and rows top to bottom within each column.
    ///
    /// `cur` itself is included when the grid reports it accessible; callers
    /// that walk the result must skip it.
    fn accessible_coordinates(&self, cur: ModelCoordinate, buf: &mut Vec<ModelCoordinate>) {
        buf.clear();
        for x in cur.x - 1..=cur.x + 1 {
            for y in cur.y - 1..=cur.y + 1 {
                let pt = ModelCoordinate::new_3d(x, y, cur.z);
                if self.is_accessible(cur, pt) {
                    buf.push(pt);
                }
            }
        }
    }

    /// Manhattan distance on layer coordinates.
    fn heuristic_cost(&self, cur: ModelCoordinate, target: ModelCoordinate) -> f64 {
        f64::from((target.x - cur.x).abs() + (target.y - cur.y).abs())
    }

    /// Map position of a cell centre.
    fn cell_to_map(&self, cell: ModelCoordinate) -> ExactModelCoordinate {
        self.to_map_coordinates(cell.into())
    }

    fn x_scale(&self) -> f64 {
        self.transform().x_scale()
    }

    fn y_scale(&self) -> f64 {
        self.transform().y_scale()
    }

    fn rotation(&self) -> f64 {
        self.transform().rotation()
    }
}

impl Clone for Box<dyn CellGrid> {
    fn clone(&self) -> Self {
        self.clone_grid()
    }
}

/// Create a grid from its type name with default configuration.
///
/// Square grids created this way do not allow diagonal steps.
pub fn grid_from_type(grid_type: &str) -> Result<Box<dyn CellGrid>, GridError> {
    match grid_type {
        SQUARE_GRID_TYPE => Ok(Box::new(SquareGrid::new(false))),
        HEX_GRID_TYPE => Ok(Box::new(HexGrid::new())),
        other => Err(GridError::UnknownGridType(other.to_string())),
    }
}

/// Return `start..=end` computed from the canonical endpoint so that swapping
/// the endpoints only reverses the result.
pub(crate) fn canonical_line(
    start: ModelCoordinate,
    end: ModelCoordinate,
    raster: impl Fn(ModelCoordinate, ModelCoordinate) -> Vec<ModelCoordinate>,
) -> Vec<ModelCoordinate> {
    if end < start {
        let mut coords = raster(end, start);
        coords.reverse();
        coords
    } else {
        raster(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_by_type_name() {
        assert_eq!(grid_from_type("square").unwrap().grid_type(), SQUARE_GRID_TYPE);
        assert_eq!(grid_from_type("hexagonal").unwrap().cell_side_count(), 6);
        assert_eq!(
            grid_from_type("triangle").unwrap_err(),
            GridError::UnknownGridType("triangle".into())
        );
    }

    #[test]
    fn boxed_clone_keeps_configuration() {
        let mut grid: Box<dyn CellGrid> = Box::new(SquareGrid::new(true));
        grid.transform_mut().set_scale(3.0).unwrap();
        grid.transform_mut().set_rotation(45.0).unwrap();
        let copy = grid.clone();
        assert_eq!(copy.transform(), grid.transform());
        assert!(copy.is_accessible(ModelCoordinate::new(0, 0), ModelCoordinate::new(1, 1)));
    }

    #[test]
    fn accessible_scan_order_is_column_major() {
        let grid = SquareGrid::new(false);
        let mut buf = Vec::new();
        grid.accessible_coordinates(ModelCoordinate::new(5, 5), &mut buf);
        assert_eq!(
            buf,
            vec![
                ModelCoordinate::new(4, 5),
                ModelCoordinate::new(5, 4),
                ModelCoordinate::new(5, 6),
                ModelCoordinate::new(6, 5),
            ]
        );
    }

    #[test]
    fn heuristic_cost_is_manhattan_for_both_grids() {
        let a = ModelCoordinate::new(1, 2);
        let b = ModelCoordinate::new(4, -2);
        assert_eq!(SquareGrid::new(true).heuristic_cost(a, b), 7.0);
        assert_eq!(HexGrid::new().heuristic_cost(a, b), 7.0);
    }
}
