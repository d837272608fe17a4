use super::{CellGrid, GridTransform, SQUARE_GRID_TYPE, canonical_line};
use crate::geom::{ExactModelCoordinate, ModelCoordinate};

/// Cost of a diagonal step.
#[allow(clippy::approx_constant)]
pub const DIAGONAL_COST: f64 = 1.4142;

/// A grid of unit squares, with optional diagonal movement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SquareGrid {
    transform: GridTransform,
    allow_diagonals: bool,
}

impl SquareGrid {
    pub fn new(allow_diagonals: bool) -> Self {
        Self {
            transform: GridTransform::new(),
            allow_diagonals,
        }
    }

    pub fn with_transform(allow_diagonals: bool, transform: GridTransform) -> Self {
        Self {
            transform,
            allow_diagonals,
        }
    }

    #[inline]
    pub fn allow_diagonals(&self) -> bool {
        self.allow_diagonals
    }

    pub fn set_allow_diagonals(&mut self, allow: bool) {
        self.allow_diagonals = allow;
    }

    /// Exactly one axis differs, by one.
    pub fn is_accessible_orthogonal(&self, cur: ModelCoordinate, target: ModelCoordinate) -> bool {
        let dx = (target.x - cur.x).abs();
        let dy = (target.y - cur.y).abs();
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }

    /// Both axes differ by one, and diagonals are enabled.
    pub fn is_accessible_diagonal(&self, cur: ModelCoordinate, target: ModelCoordinate) -> bool {
        self.allow_diagonals && (target.x - cur.x).abs() == 1 && (target.y - cur.y).abs() == 1
    }
}

impl CellGrid for SquareGrid {
    fn grid_type(&self) -> &'static str {
        SQUARE_GRID_TYPE
    }

    fn name(&self) -> &'static str {
        "Square Grid"
    }

    fn cell_side_count(&self) -> u32 {
        4
    }

    fn transform(&self) -> &GridTransform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut GridTransform {
        &mut self.transform
    }

    fn is_accessible(&self, cur: ModelCoordinate, target: ModelCoordinate) -> bool {
        self.is_accessible_orthogonal(cur, target) || self.is_accessible_diagonal(cur, target)
    }

    fn adjacent_cost(&self, cur: ModelCoordinate, target: ModelCoordinate) -> f64 {
        if cur.same_cell(target) {
            0.0
        } else if cur.x != target.x && cur.y != target.y {
            DIAGONAL_COST
        } else {
            1.0
        }
    }

    fn to_map_coordinates(&self, layer_coords: ExactModelCoordinate) -> ExactModelCoordinate {
        self.transform.apply(layer_coords)
    }

    fn to_layer_coordinates(&self, map_coords: ExactModelCoordinate) -> ModelCoordinate {
        self.to_exact_layer_coordinates(map_coords).round()
    }

    fn to_exact_layer_coordinates(
        &self,
        map_coords: ExactModelCoordinate,
    ) -> ExactModelCoordinate {
        self.transform.apply_inverse(map_coords)
    }

    fn vertices(&self, cell: ModelCoordinate) -> Vec<ExactModelCoordinate> {
        let x = f64::from(cell.x);
        let y = f64::from(cell.y);
        let z = f64::from(cell.z);
        vec![
            ExactModelCoordinate::new_3d(x - 0.5, y - 0.5, z),
            ExactModelCoordinate::new_3d(x + 0.5, y - 0.5, z),
            ExactModelCoordinate::new_3d(x + 0.5, y + 0.5, z),
            ExactModelCoordinate::new_3d(x - 0.5, y + 0.5, z),
        ]
    }

    fn coordinates_in_line(
        &self,
        start: ModelCoordinate,
        end: ModelCoordinate,
    ) -> Vec<ModelCoordinate> {
        canonical_line(start, end, bresenham)
    }

    fn to_multi_coordinates(
        &self,
        position: ModelCoordinate,
        orig: &[ModelCoordinate],
        reverse: bool,
    ) -> Vec<ModelCoordinate> {
        orig.iter()
            .map(|&off| if reverse { position - off } else { position + off })
            .collect()
    }

    fn clone_grid(&self) -> Box<dyn CellGrid> {
        Box::new(self.clone())
    }
}

fn bresenham(start: ModelCoordinate, end: ModelCoordinate) -> Vec<ModelCoordinate> {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cur = start;
    let mut coords = Vec::with_capacity((dx - dy) as usize + 1);
    loop {
        coords.push(cur);
        if cur.same_cell(end) {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cur.x += sx;
        }
        if e2 <= dx {
            err += dx;
            cur.y += sy;
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> ModelCoordinate {
        ModelCoordinate::new(x, y)
    }

    #[test]
    fn orthogonal_and_diagonal_predicates() {
        let four = SquareGrid::new(false);
        let eight = SquareGrid::new(true);
        assert!(four.is_accessible_orthogonal(c(0, 0), c(0, 1)));
        assert!(!four.is_accessible_orthogonal(c(0, 0), c(1, 1)));
        assert!(!four.is_accessible_orthogonal(c(0, 0), c(0, 0)));
        assert!(!four.is_accessible_diagonal(c(0, 0), c(1, 1)));
        assert!(eight.is_accessible_diagonal(c(0, 0), c(-1, 1)));
        assert!(!eight.is_accessible_diagonal(c(0, 0), c(2, 2)));
        assert!(!eight.is_accessible(c(0, 0), c(2, 0)));
    }

    #[test]
    fn adjacent_costs() {
        let grid = SquareGrid::new(true);
        assert_eq!(grid.adjacent_cost(c(3, 3), c(3, 3)), 0.0);
        assert_eq!(grid.adjacent_cost(c(3, 3), c(4, 3)), 1.0);
        assert_eq!(grid.adjacent_cost(c(3, 3), c(4, 4)), DIAGONAL_COST);
    }

    #[test]
    fn eight_neighbours_with_diagonals() {
        let grid = SquareGrid::new(true);
        let mut buf = Vec::new();
        grid.accessible_coordinates(c(0, 0), &mut buf);
        assert_eq!(buf.len(), 8);
        assert!(!buf.contains(&c(0, 0)));
    }

    #[test]
    fn map_round_trip_with_transform() {
        let t = GridTransform::from_parts(30.0, 2.0, 1.5, 7.0, -3.0, 0.0).unwrap();
        let grid = SquareGrid::with_transform(false, t);
        for x in -6..6 {
            for y in -6..6 {
                let cell = c(x, y);
                assert_eq!(grid.to_layer_coordinates(grid.cell_to_map(cell)), cell);
            }
        }
    }

    #[test]
    fn square_vertices() {
        let v = SquareGrid::new(false).vertices(c(1, 1));
        assert_eq!(v.len(), 4);
        assert_eq!(v[0], ExactModelCoordinate::new(0.5, 0.5));
        assert_eq!(v[2], ExactModelCoordinate::new(1.5, 1.5));
    }

    #[test]
    fn line_has_both_endpoints_and_no_repeats() {
        let grid = SquareGrid::new(false);
        let line = grid.coordinates_in_line(c(0, 0), c(5, 2));
        assert_eq!(line.first(), Some(&c(0, 0)));
        assert_eq!(line.last(), Some(&c(5, 2)));
        assert_eq!(line.len(), 6);
        assert!(line.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn swapped_line_is_reversed() {
        let grid = SquareGrid::new(false);
        let forward = grid.coordinates_in_line(c(-2, 4), c(3, -1));
        let mut backward = grid.coordinates_in_line(c(3, -1), c(-2, 4));
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn multi_coordinates_offset_and_reverse() {
        let grid = SquareGrid::new(false);
        let offs = [c(0, 0), c(1, 0), c(0, -1)];
        assert_eq!(
            grid.to_multi_coordinates(c(5, 5), &offs, false),
            vec![c(5, 5), c(6, 5), c(5, 4)]
        );
        assert_eq!(
            grid.to_multi_coordinates(c(5, 5), &offs, true),
            vec![c(5, 5), c(4, 5), c(5, 6)]
        );
    }
}
