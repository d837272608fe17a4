//! **tileroute-core**: Tile map geometry for route finding.
//!
//! This crate provides the value types and map model the route finder in
//! `tileroute-paths` works on: integer and exact coordinates, square and hex
//! cell grids with their layer-to-map transforms, and maps made of layers that
//! hold blocking instances, transitions and cost areas.

pub mod error;
pub mod geom;
pub mod grids;
pub mod layer;
pub mod location;
pub mod map;

pub use error::GridError;
pub use geom::{ExactModelCoordinate, ModelCoordinate, Range};
pub use grids::{CellGrid, GridTransform, HexGrid, SquareGrid, grid_from_type};
pub use layer::{Instance, Layer, LayerId, Transition};
pub use location::Location;
pub use map::Map;
