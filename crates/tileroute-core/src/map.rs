//! The map: an ordered set of layers.

use log::debug;

use crate::geom::Range;
use crate::grids::CellGrid;
use crate::layer::{Layer, LayerId};
use crate::location::Location;

/// Owns every layer. Route finders borrow it for each call; nothing in this
/// crate keeps a global map.
#[derive(Debug, Clone, Default)]
pub struct Map {
    name: String,
    layers: Vec<Layer>,
}

impl Map {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a layer and return its id.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        grid: Box<dyn CellGrid>,
        bounds: Range,
    ) -> LayerId {
        let id = LayerId(self.layers.len());
        let layer = Layer::new(id, name, grid, bounds);
        debug!("{}: added {} \"{}\" ({})", self.name, id, layer.name(), bounds);
        self.layers.push(layer);
        id
    }

    #[inline]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    #[inline]
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether `loc` names a layer of this map.
    pub fn contains(&self, loc: &Location) -> bool {
        self.layer(loc.layer()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::ModelCoordinate;
    use crate::grids::{HexGrid, SquareGrid};

    #[test]
    fn layers_are_indexed_in_insertion_order() {
        let mut map = Map::new("town");
        let a = map.add_layer("ground", Box::new(SquareGrid::new(true)), Range::sized(8, 8));
        let b = map.add_layer("roof", Box::new(HexGrid::new()), Range::sized(4, 4));
        assert_eq!((a, b), (LayerId(0), LayerId(1)));
        assert_eq!(map.layer(b).map(|l| l.grid().grid_type()), Some("hexagonal"));
        assert_eq!(map.layer_count(), 2);
        assert!(map.contains(&Location::new(a, ModelCoordinate::ZERO)));
        assert!(!map.contains(&Location::new(LayerId(7), ModelCoordinate::ZERO)));
    }
}
