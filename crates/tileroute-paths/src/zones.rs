//! Zone labelling.
//!
//! A zone is a connected component of unblocked cells on one layer, using
//! the layer grid's adjacency inside its search space. Two cells in the same
//! zone are connected by a walkable route that never leaves the layer.

use std::collections::BTreeMap;
use std::rc::Rc;

use tileroute_core::{Layer, LayerId, Location, Map, ModelCoordinate};

use crate::error::PathError;
use crate::search_space::{SearchSpace, SearchSpaceCache};

/// A connected region of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub layer: LayerId,
    pub label: usize,
}

/// Zone labels of every cell of one layer's search space.
#[derive(Debug, Clone)]
pub struct ZoneMap {
    space: Rc<SearchSpace>,
    labels: Vec<i32>,
    count: usize,
    revision: u64,
}

impl ZoneMap {
    /// Label the unblocked cells of `layer`. Blocked cells get no zone.
    ///
    /// Prefer [`SearchSpaceCache::zone_map`], which reuses the labels while
    /// the layer is unchanged.
    pub fn build(space: Rc<SearchSpace>, layer: &Layer) -> Self {
        let len = space.len();
        let mut labels = vec![-1; len];
        let mut stack: Vec<usize> = Vec::new();
        let mut nbuf: Vec<ModelCoordinate> = Vec::with_capacity(9);
        let grid = space.grid();
        let mut label: i32 = 0;

        for start in 0..len {
            if labels[start] >= 0 || layer.cell_contains_blocking_instance(space.int_to_coord(start)) {
                continue;
            }

            // Iterative DFS from `start`.
            stack.clear();
            stack.push(start);
            labels[start] = label;

            while let Some(ci) = stack.pop() {
                grid.accessible_coordinates(space.int_to_coord(ci), &mut nbuf);
                for &np in nbuf.iter() {
                    let Some(ni) = space.coord_to_int(np) else {
                        continue;
                    };
                    if labels[ni] < 0 && !layer.cell_contains_blocking_instance(np) {
                        labels[ni] = label;
                        stack.push(ni);
                    }
                }
            }

            label += 1;
        }

        Self {
            space,
            labels,
            count: label as usize,
            revision: layer.revision(),
        }
    }

    #[inline]
    pub fn layer(&self) -> LayerId {
        self.space.layer()
    }

    pub fn space(&self) -> &Rc<SearchSpace> {
        &self.space
    }

    /// Revision of the layer when it was labelled.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of zones on the layer.
    #[inline]
    pub fn zone_count(&self) -> usize {
        self.count
    }

    /// Zone of a cell, or `None` for blocked or out-of-bounds cells.
    pub fn zone_at(&self, cell: ModelCoordinate) -> Option<Zone> {
        let idx = self.space.coord_to_int(cell)?;
        let label = self.labels[idx];
        if label < 0 {
            None
        } else {
            Some(Zone {
                layer: self.layer(),
                label: label as usize,
            })
        }
    }
}

/// Zone maps of every layer of a map.
#[derive(Debug, Clone, Default)]
pub struct Zones {
    maps: BTreeMap<LayerId, Rc<ZoneMap>>,
}

impl Zones {
    /// Zone maps of every layer of `map`, taken from `spaces` and relabelled
    /// only where a layer changed.
    pub fn build(map: &Map, spaces: &mut SearchSpaceCache) -> Result<Self, PathError> {
        let mut maps = BTreeMap::new();
        for layer in map.layers() {
            maps.insert(layer.id(), spaces.zone_map(map, layer.id())?);
        }
        Ok(Self { maps })
    }

    pub fn layer(&self, layer: LayerId) -> Option<&ZoneMap> {
        self.maps.get(&layer).map(Rc::as_ref)
    }

    pub fn zone_at(&self, layer: LayerId, cell: ModelCoordinate) -> Option<Zone> {
        self.maps.get(&layer)?.zone_at(cell)
    }

    /// Zone of the cell containing `loc`.
    pub fn zone_of(&self, loc: &Location) -> Option<Zone> {
        let zones = self.maps.get(&loc.layer())?;
        zones.zone_at(zones.space.cell_of(loc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileroute_core::{HexGrid, Instance, Range, SquareGrid};

    fn c(x: i32, y: i32) -> ModelCoordinate {
        ModelCoordinate::new(x, y)
    }

    /// 5x5 square layer split by a wall on column 2.
    fn walled() -> Map {
        let mut map = Map::new("zones");
        let id = map.add_layer("ground", Box::new(SquareGrid::new(false)), Range::sized(5, 5));
        let layer = map.layer_mut(id).unwrap();
        for y in 0..5 {
            layer.add_instance(Instance::new(format!("wall{y}"), Location::new(id, c(2, y)), true));
        }
        map
    }

    #[test]
    fn wall_splits_layer_in_two() {
        let map = walled();
        let mut cache = SearchSpaceCache::new();
        let zones = Zones::build(&map, &mut cache).unwrap();
        let zm = zones.layer(LayerId(0)).unwrap();
        assert_eq!(zm.zone_count(), 2);
        assert_eq!(zm.zone_at(c(0, 0)), zm.zone_at(c(1, 4)));
        assert_ne!(zm.zone_at(c(0, 0)), zm.zone_at(c(4, 0)));
        assert_eq!(zm.zone_at(c(2, 2)), None);
        assert_eq!(zm.zone_at(c(9, 9)), None);
    }

    #[test]
    fn diagonals_connect_through_a_gap() {
        let mut map = Map::new("zones");
        let id = map.add_layer("ground", Box::new(SquareGrid::new(true)), Range::sized(3, 3));
        let layer = map.layer_mut(id).unwrap();
        layer.add_instance(Instance::new("a", Location::new(id, c(1, 0)), true));
        layer.add_instance(Instance::new("b", Location::new(id, c(0, 1)), true));
        let space = Rc::new(SearchSpace::new(&map.layers()[0]));
        let zm = ZoneMap::build(space, &map.layers()[0]);
        assert_eq!(zm.zone_count(), 1);
    }

    #[test]
    fn hex_layer_is_one_zone() {
        let mut map = Map::new("hex");
        map.add_layer("ground", Box::new(HexGrid::new()), Range::sized(6, 6));
        let mut cache = SearchSpaceCache::new();
        let zones = Zones::build(&map, &mut cache).unwrap();
        assert_eq!(zones.layer(LayerId(0)).map(|z| z.zone_count()), Some(1));
        let loc = Location::new(LayerId(0), c(5, 5));
        assert_eq!(zones.zone_of(&loc), Some(Zone { layer: LayerId(0), label: 0 }));
    }

    #[test]
    fn rebuilding_reuses_unchanged_layers() {
        let mut map = walled();
        let upper = map.add_layer("upper", Box::new(SquareGrid::new(false)), Range::sized(3, 3));
        let mut cache = SearchSpaceCache::new();
        let first = Zones::build(&map, &mut cache).unwrap();

        map.layer_mut(LayerId(0)).unwrap().remove_instance("wall2");
        let second = Zones::build(&map, &mut cache).unwrap();
        assert_eq!(second.layer(LayerId(0)).map(ZoneMap::zone_count), Some(1));
        assert!(Rc::ptr_eq(&first.maps[&upper], &second.maps[&upper]));
        assert!(!Rc::ptr_eq(&first.maps[&LayerId(0)], &second.maps[&LayerId(0)]));
    }
}
