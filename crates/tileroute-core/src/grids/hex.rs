//! Pointy-top hexagons of width one, with odd rows shifted half a cell to the
//! right ("odd-r" offset layout).
//!
//! Layer coordinates are (column, row). In map space the rows are
//! [`VERTICAL_MULTIP`] apart and the horizontal shift of a row changes
//! gradually between rows, so fractional positions stay continuous.

use log::trace;

use super::{CellGrid, GridTransform, HEX_GRID_TYPE, canonical_line};
use crate::geom::{ExactModelCoordinate, ModelCoordinate};

/// Distance from a hex centre to the middle of a side.
pub const HEX_TO_EDGE: f64 = 0.5;
/// Distance from a hex centre to a corner: 0.5 / cos(30°).
pub const HEX_TO_CORNER: f64 = 0.577_350_269_189_625_8;
/// Half the length of one side: `HEX_TO_CORNER * sin(30°)`.
pub const HEX_EDGE_HALF: f64 = 0.288_675_134_594_812_87;
/// Vertical distance between two rows: sqrt(1 - 0.5²).
pub const VERTICAL_MULTIP: f64 = 0.866_025_403_784_438_6;
/// Slope of the slanted sides.
pub const HEX_EDGE_GRADIENT: f64 = 0.577_350_269_189_625_8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HexGrid {
    transform: GridTransform,
}

impl HexGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: GridTransform) -> Self {
        Self { transform }
    }

    /// Horizontal shift at a (possibly fractional) row. Zero on even rows,
    /// `HEX_TO_EDGE` on odd rows and linear in between.
    pub fn x_zigzag_offset(y: f64) -> f64 {
        let ay = y.abs();
        let row = ay.trunc();
        let mut offset = ay - row;
        if row % 2.0 == 1.0 {
            offset = 1.0 - offset;
        }
        HEX_TO_EDGE * offset
    }
}

impl CellGrid for HexGrid {
    fn grid_type(&self) -> &'static str {
        HEX_GRID_TYPE
    }

    fn name(&self) -> &'static str {
        "Hex Grid"
    }

    fn cell_side_count(&self) -> u32 {
        6
    }

    fn transform(&self) -> &GridTransform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut GridTransform {
        &mut self.transform
    }

    /// Same row: left, self and right. Other rows: on odd rows the cell
    /// above or below and the one to its right, on even rows the one to its
    /// left. The relation is not symmetric across row parity.
    fn is_accessible(&self, cur: ModelCoordinate, target: ModelCoordinate) -> bool {
        let dx = target.x - cur.x;
        let dy = target.y - cur.y;
        if dx.abs() > 1 || dy.abs() > 1 {
            return false;
        }
        if dy == 0 {
            return true;
        }
        if cur.is_odd_row() { dx >= 0 } else { dx <= 0 }
    }

    fn adjacent_cost(&self, cur: ModelCoordinate, target: ModelCoordinate) -> f64 {
        if cur.same_cell(target) { 0.0 } else { 1.0 }
    }

    fn to_map_coordinates(&self, layer_coords: ExactModelCoordinate) -> ExactModelCoordinate {
        let mut p = layer_coords;
        p.x += Self::x_zigzag_offset(layer_coords.y);
        p.y *= VERTICAL_MULTIP;
        self.transform.apply(p)
    }

    fn to_exact_layer_coordinates(
        &self,
        map_coords: ExactModelCoordinate,
    ) -> ExactModelCoordinate {
        let mut p = self.transform.apply_inverse(map_coords);
        p.y /= VERTICAL_MULTIP;
        p.x -= Self::x_zigzag_offset(p.y);
        p
    }

    fn to_layer_coordinates(&self, map_coords: ExactModelCoordinate) -> ModelCoordinate {
        let p = self.transform.apply_inverse(map_coords);
        let fy = p.y / VERTICAL_MULTIP;
        let row = fy.round() as i32;
        let shift = if row & 1 == 1 { HEX_TO_EDGE } else { 0.0 };
        let col = (p.x - shift).round() as i32;

        // Offset from the centre of the rounded cell, in unscaled map units.
        let dx = p.x - (f64::from(col) + shift);
        let dy = (fy - f64::from(row)) * VERTICAL_MULTIP;

        let mut result = ModelCoordinate::new_3d(col, row, p.z.round() as i32);
        if dy.abs() > HEX_TO_CORNER - dx.abs() * HEX_EDGE_GRADIENT {
            // Beyond a slanted side: the point belongs to one of the four
            // diagonal neighbours.
            let odd = result.is_odd_row();
            result.y += if dy > 0.0 { 1 } else { -1 };
            result.x = match (odd, dx > 0.0) {
                (true, true) => col + 1,
                (true, false) => col,
                (false, true) => col,
                (false, false) => col - 1,
            };
        }
        trace!("hex map {map_coords} -> layer {result}");
        result
    }

    fn vertices(&self, cell: ModelCoordinate) -> Vec<ExactModelCoordinate> {
        let x = f64::from(cell.x);
        let y = f64::from(cell.y);
        let z = f64::from(cell.z);
        let horiz_shift = if cell.is_odd_row() { HEX_TO_EDGE } else { 0.0 };
        let vert_shift = 1.0 / VERTICAL_MULTIP;
        let corner = |dx: f64, dy: f64| {
            let ty = y + vert_shift * dy;
            let tx = x + dx - Self::x_zigzag_offset(ty) + horiz_shift;
            ExactModelCoordinate::new_3d(tx, ty, z)
        };
        vec![
            corner(-HEX_TO_EDGE, -HEX_EDGE_HALF),
            corner(0.0, -HEX_TO_CORNER),
            corner(HEX_TO_EDGE, -HEX_EDGE_HALF),
            corner(HEX_TO_EDGE, HEX_EDGE_HALF),
            corner(0.0, HEX_TO_CORNER),
            corner(-HEX_TO_EDGE, HEX_EDGE_HALF),
        ]
    }

    fn coordinates_in_line(
        &self,
        start: ModelCoordinate,
        end: ModelCoordinate,
    ) -> Vec<ModelCoordinate> {
        canonical_line(start, end, hex_line)
    }

    fn to_multi_coordinates(
        &self,
        position: ModelCoordinate,
        orig: &[ModelCoordinate],
        reverse: bool,
    ) -> Vec<ModelCoordinate> {
        let anchor = Cube::from_offset(position);
        orig.iter()
            .map(|&off| {
                let delta = Cube::from_offset(off);
                let cube = if reverse {
                    anchor.sub(delta)
                } else {
                    anchor.add(delta)
                };
                cube.to_offset(position.z)
            })
            .collect()
    }

    fn clone_grid(&self) -> Box<dyn CellGrid> {
        Box::new(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Cube coordinates
// ---------------------------------------------------------------------------

/// Axial hex coordinates; the third cube axis is `-q - r`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Cube {
    q: i32,
    r: i32,
}

impl Cube {
    /// Row parity changes the column origin, so this is not a plain vector
    /// conversion.
    fn from_offset(c: ModelCoordinate) -> Self {
        Self {
            q: c.x - (c.y - (c.y & 1)) / 2,
            r: c.y,
        }
    }

    fn to_offset(self, z: i32) -> ModelCoordinate {
        ModelCoordinate::new_3d(self.q + (self.r - (self.r & 1)) / 2, self.r, z)
    }

    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }

    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
        }
    }

    fn distance(self, other: Self) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.q + self.r - other.q - other.r).abs();
        dq.max(dr).max(ds)
    }

    fn round(q: f64, r: f64, s: f64) -> Self {
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();
        let dq = (rq - q).abs();
        let dr = (rr - r).abs();
        let ds = (rs - s).abs();
        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }
        Self {
            q: rq as i32,
            r: rr as i32,
        }
    }
}

/// Interpolate in cube space. The endpoints are nudged off the exact cell
/// edges so that diagonal steps across a parity change round consistently.
fn hex_line(start: ModelCoordinate, end: ModelCoordinate) -> Vec<ModelCoordinate> {
    let a = Cube::from_offset(start);
    let b = Cube::from_offset(end);
    let n = a.distance(b);
    if n == 0 {
        return vec![start];
    }
    const EPS: (f64, f64, f64) = (1e-6, 2e-6, -3e-6);
    let (aq, ar) = (f64::from(a.q) + EPS.0, f64::from(a.r) + EPS.1);
    let as_ = -f64::from(a.q) - f64::from(a.r) + EPS.2;
    let (bq, br) = (f64::from(b.q) + EPS.0, f64::from(b.r) + EPS.1);
    let bs = -f64::from(b.q) - f64::from(b.r) + EPS.2;

    let steps = f64::from(n);
    (0..=n)
        .map(|i| {
            let t = f64::from(i) / steps;
            let cube = Cube::round(aq + (bq - aq) * t, ar + (br - ar) * t, as_ + (bs - as_) * t);
            cube.to_offset(start.z)
        })
        .collect()
}
