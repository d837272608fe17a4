//! Distance estimates used to order the search frontier.

use std::fmt;

use tileroute_core::ModelCoordinate;
use tileroute_core::grids::{HEX_GRID_TYPE, SQUARE_GRID_TYPE};

use crate::error::PathError;

/// Estimated cost from `cur` to `dest`, matching one cell grid type.
pub trait Heuristic: fmt::Debug + Sync {
    fn calculate(&self, cur: ModelCoordinate, dest: ModelCoordinate) -> f64;

    /// The cell grid type this heuristic belongs to.
    fn grid_type(&self) -> &'static str;
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareGridHeuristic;

impl Heuristic for SquareGridHeuristic {
    fn calculate(&self, cur: ModelCoordinate, dest: ModelCoordinate) -> f64 {
        f64::from((dest.x - cur.x).abs() + (dest.y - cur.y).abs())
    }

    fn grid_type(&self) -> &'static str {
        SQUARE_GRID_TYPE
    }
}

/// `dx² + dy² + dx·dy` on layer coordinates.
///
/// This is not a distance: it grows quadratically and makes the search
/// greedy on hex layers. It also decides which of several equal routes is
/// found.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexGridHeuristic;

impl Heuristic for HexGridHeuristic {
    fn calculate(&self, cur: ModelCoordinate, dest: ModelCoordinate) -> f64 {
        let dx = f64::from(dest.x - cur.x);
        let dy = f64::from(dest.y - cur.y);
        dx * dx + dy * dy + dx * dy
    }

    fn grid_type(&self) -> &'static str {
        HEX_GRID_TYPE
    }
}

static SQUARE: SquareGridHeuristic = SquareGridHeuristic;
static HEX: HexGridHeuristic = HexGridHeuristic;

/// The heuristic for a cell grid type name.
pub fn heuristic_for(grid_type: &str) -> Result<&'static dyn Heuristic, PathError> {
    match grid_type {
        SQUARE_GRID_TYPE => Ok(&SQUARE),
        HEX_GRID_TYPE => Ok(&HEX),
        other => Err(PathError::UnknownHeuristic(other.to_string())),
    }
}
