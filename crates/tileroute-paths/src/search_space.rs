//! Search spaces: the bounded region of a layer a route search may explore,
//! and the cell-to-index mapping used to size per-search arrays.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;
use tileroute_core::{CellGrid, Layer, LayerId, Location, Map, ModelCoordinate, Range};

use crate::error::PathError;
use crate::zones::ZoneMap;

/// The bounds and grid of one layer, captured when the space is created.
///
/// A search space is read-only and shared by every search targeting its
/// layer. It does not follow later changes to the layer's bounds or grid;
/// drop it from the [`SearchSpaceCache`] when those change.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    layer: LayerId,
    bounds: Range,
    width: usize,
    grid: Box<dyn CellGrid>,
}

impl SearchSpace {
    pub fn new(layer: &Layer) -> Self {
        let bounds = layer.bounds();
        Self {
            layer: layer.id(),
            bounds,
            width: bounds.width().max(0) as usize,
            grid: layer.grid().clone_grid(),
        }
    }

    #[inline]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn grid(&self) -> &dyn CellGrid {
        self.grid.as_ref()
    }

    /// Number of cells, i.e. the length of per-search arrays.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Largest valid index. Meaningless for an empty space.
    #[inline]
    pub fn max_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Flat index of a cell. Returns `None` outside the bounds.
    #[inline]
    pub fn coord_to_int(&self, cell: ModelCoordinate) -> Option<usize> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let x = (cell.x - self.bounds.min.x) as usize;
        let y = (cell.y - self.bounds.min.y) as usize;
        Some(y * self.width + x)
    }

    /// The cell at a flat index. The elevation is always zero.
    #[inline]
    pub fn int_to_coord(&self, idx: usize) -> ModelCoordinate {
        let x = (idx % self.width) as i32 + self.bounds.min.x;
        let y = (idx / self.width) as i32 + self.bounds.min.y;
        ModelCoordinate::new(x, y)
    }

    #[inline]
    pub fn contains(&self, cell: ModelCoordinate) -> bool {
        self.bounds.contains(cell)
    }

    /// Whether `loc` is on this space's layer and inside its bounds.
    pub fn is_in_search_space(&self, loc: &Location) -> bool {
        loc.layer() == self.layer && self.contains(loc.cell(self.grid()))
    }

    /// The cell of `loc` on this space's grid.
    #[inline]
    pub fn cell_of(&self, loc: &Location) -> ModelCoordinate {
        loc.cell(self.grid())
    }
}

// ---------------------------------------------------------------------------
// SearchSpaceCache
// ---------------------------------------------------------------------------

/// Lazily created search spaces, one per layer, and the zone maps labelled
/// over them.
#[derive(Debug, Default)]
pub struct SearchSpaceCache {
    spaces: BTreeMap<LayerId, Rc<SearchSpace>>,
    zones: BTreeMap<LayerId, Rc<ZoneMap>>,
}

impl SearchSpaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The search space of `layer`, created on first use.
    pub fn get_or_create(&mut self, map: &Map, layer: LayerId) -> Result<Rc<SearchSpace>, PathError> {
        if let Some(space) = self.spaces.get(&layer) {
            return Ok(Rc::clone(space));
        }
        let l = map.layer(layer).ok_or(PathError::UnknownLayer(layer))?;
        let space = Rc::new(SearchSpace::new(l));
        debug!(
            "search space for {layer}: {} ({} cells, {})",
            space.bounds(),
            space.len(),
            space.grid().name()
        );
        self.spaces.insert(layer, Rc::clone(&space));
        Ok(space)
    }

    pub fn get(&self, layer: LayerId) -> Option<Rc<SearchSpace>> {
        self.spaces.get(&layer).cloned()
    }

    /// Zone labels of `layer`. The cached map is reused until the layer's
    /// revision or its search space changes.
    pub fn zone_map(&mut self, map: &Map, layer: LayerId) -> Result<Rc<ZoneMap>, PathError> {
        let space = self.get_or_create(map, layer)?;
        let l = map.layer(layer).ok_or(PathError::UnknownLayer(layer))?;
        let current = self
            .zones
            .get(&layer)
            .filter(|zones| zones.revision() == l.revision() && Rc::ptr_eq(zones.space(), &space));
        if let Some(zones) = current {
            return Ok(Rc::clone(zones));
        }
        let zones = Rc::new(ZoneMap::build(space, l));
        debug!(
            "zones for {layer}: {} at revision {}",
            zones.zone_count(),
            zones.revision()
        );
        self.zones.insert(layer, Rc::clone(&zones));
        Ok(zones)
    }

    /// Forget the space and zones of one layer. Searches already running
    /// keep theirs.
    pub fn invalidate(&mut self, layer: LayerId) -> bool {
        self.zones.remove(&layer);
        self.spaces.remove(&layer).is_some()
    }

    pub fn clear(&mut self) {
        self.spaces.clear();
        self.zones.clear();
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}
