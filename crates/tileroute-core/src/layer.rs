//! Layers: one grid plane of a [`Map`](crate::Map) with its occupants.
//!
//! The route finder only reads a layer. It asks for the grid, the declared
//! bounds, whether a cell holds a blocking instance, the transitions that
//! lead to other layers, cost multipliers for named cost areas, named areas
//! and cell heights.
//!
//! Cells are flat: everything indexed by cell ignores `z`, so an elevated
//! instance still stands on (and blocks) the cell below it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;

use crate::geom::{ExactModelCoordinate, ModelCoordinate, Range};
use crate::grids::CellGrid;
use crate::location::Location;

/// Index of a layer inside its map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerId(pub usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// An object standing on a layer.
///
/// Instances are dynamic (movable) unless marked static. Routes may choose
/// to walk through dynamic blockers.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    id: String,
    blocking: bool,
    is_static: bool,
    location: Location,
}

impl Instance {
    pub fn new(id: impl Into<String>, location: Location, blocking: bool) -> Self {
        Self {
            id: id.into(),
            blocking,
            is_static: false,
            location,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }
}

/// A cell that leads to a cell on another layer (stairs, portals).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub from: ModelCoordinate,
    pub to_layer: LayerId,
    pub to: ModelCoordinate,
}

#[derive(Clone, Debug, Default)]
struct CostArea {
    multiplier: f64,
    cells: BTreeSet<ModelCoordinate>,
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    grid: Box<dyn CellGrid>,
    bounds: Range,
    instances: BTreeMap<String, Instance>,
    // Flat cell -> ids of the instances standing on it.
    cells: BTreeMap<ModelCoordinate, BTreeSet<String>>,
    transitions: Vec<Transition>,
    costs: BTreeMap<String, CostArea>,
    areas: BTreeMap<String, BTreeSet<ModelCoordinate>>,
    heights: BTreeMap<ModelCoordinate, i32>,
    revision: u64,
}

impl Layer {
    /// Create an empty layer. `bounds` is the region route searches on this
    /// layer may explore.
    pub fn new(id: LayerId, name: impl Into<String>, grid: Box<dyn CellGrid>, bounds: Range) -> Self {
        Self {
            id,
            name: name.into(),
            grid,
            bounds,
            instances: BTreeMap::new(),
            cells: BTreeMap::new(),
            transitions: Vec::new(),
            costs: BTreeMap::new(),
            areas: BTreeMap::new(),
            heights: BTreeMap::new(),
            revision: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn grid(&self) -> &dyn CellGrid {
        self.grid.as_ref()
    }

    /// Changing the grid of a populated layer re-buckets its instances.
    pub fn set_grid(&mut self, grid: Box<dyn CellGrid>) {
        self.grid = grid;
        self.reindex();
        self.touch();
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Range) {
        self.bounds = bounds;
        self.touch();
    }

    /// Bumped whenever the grid, the bounds or the blocking layout of the
    /// layer change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// The cell containing an exact position on this layer.
    pub fn cell_of(&self, exact: ExactModelCoordinate) -> ModelCoordinate {
        self.grid.to_layer_coordinates(self.grid.to_map_coordinates(exact))
    }

    fn flat_cell_of(&self, exact: ExactModelCoordinate) -> ModelCoordinate {
        self.cell_of(exact).with_z(0)
    }

    // ---- instances --------------------------------------------------------

    /// Place an instance on this layer, replacing any instance with the same
    /// id. The instance's location is moved onto this layer.
    pub fn add_instance(&mut self, mut instance: Instance) -> Option<Instance> {
        instance.location.set_layer(self.id);
        let old = self.remove_instance(&instance.id);
        let cell = self.flat_cell_of(instance.location.exact_layer_coordinates());
        self.cells.entry(cell).or_default().insert(instance.id.clone());
        self.instances.insert(instance.id.clone(), instance);
        self.touch();
        old
    }

    pub fn remove_instance(&mut self, id: &str) -> Option<Instance> {
        let instance = self.instances.remove(id)?;
        let cell = self.flat_cell_of(instance.location.exact_layer_coordinates());
        self.unlink(cell, id);
        self.touch();
        Some(instance)
    }

    /// Move an instance to a new exact position. Returns false for an unknown
    /// id.
    pub fn move_instance(&mut self, id: &str, exact: ExactModelCoordinate) -> bool {
        let Some(old) = self
            .instances
            .get(id)
            .map(|i| i.location.exact_layer_coordinates())
        else {
            return false;
        };
        let (from, to) = (self.flat_cell_of(old), self.flat_cell_of(exact));
        if from != to {
            self.unlink(from, id);
            self.cells.entry(to).or_default().insert(id.to_string());
            self.touch();
        }
        if let Some(instance) = self.instances.get_mut(id) {
            instance.location.set_exact_layer_coordinates(exact);
        }
        true
    }

    pub fn set_instance_blocking(&mut self, id: &str, blocking: bool) -> bool {
        match self.instances.get_mut(id) {
            Some(instance) => {
                instance.blocking = blocking;
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Instances on the cells `coord.x..=coord.x + w`, `coord.y..=coord.y + h`,
    /// at any elevation. With `w == h == 0` this is the single cell `coord`.
    pub fn instances_in(&self, coord: ModelCoordinate, w: i32, h: i32) -> Vec<&Instance> {
        let mut found = Vec::new();
        for y in coord.y..=coord.y + h {
            for x in coord.x..=coord.x + w {
                found.extend(self.instances_on(ModelCoordinate::new(x, y)));
            }
        }
        found
    }

    fn instances_on(&self, cell: ModelCoordinate) -> impl Iterator<Item = &Instance> {
        self.cells
            .get(&cell.with_z(0))
            .into_iter()
            .flatten()
            .filter_map(|id| self.instances.get(id))
    }

    /// Whether any instance on `cell` blocks movement.
    #[inline]
    pub fn cell_contains_blocking_instance(&self, cell: ModelCoordinate) -> bool {
        self.cell_blocks(cell, false)
    }

    /// Whether `cell` is blocked. With `ignore_dynamic` only static blocking
    /// instances count.
    pub fn cell_blocks(&self, cell: ModelCoordinate, ignore_dynamic: bool) -> bool {
        self.instances_on(cell)
            .any(|i| i.is_blocking() && (i.is_static() || !ignore_dynamic))
    }

    fn unlink(&mut self, cell: ModelCoordinate, id: &str) {
        if let Some(ids) = self.cells.get_mut(&cell) {
            ids.remove(id);
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn reindex(&mut self) {
        self.cells.clear();
        let placed: Vec<(ModelCoordinate, String)> = self
            .instances
            .values()
            .map(|i| (self.flat_cell_of(i.location.exact_layer_coordinates()), i.id.clone()))
            .collect();
        for (cell, id) in placed {
            self.cells.entry(cell).or_default().insert(id);
        }
    }

    // ---- transitions ------------------------------------------------------

    pub fn add_transition(&mut self, transition: Transition) {
        debug!(
            "{}: transition {} -> {}:{}",
            self.id, transition.from, transition.to_layer, transition.to
        );
        self.transitions.push(transition);
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The first transition leaving from `cell`, if any.
    pub fn transition_at(&self, cell: ModelCoordinate) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.from.same_cell(cell))
    }

    // ---- cost areas -------------------------------------------------------

    /// Register (or update) a named cost area.
    pub fn register_cost(&mut self, cost_id: impl Into<String>, multiplier: f64) {
        self.costs.entry(cost_id.into()).or_default().multiplier = multiplier;
    }

    pub fn unregister_cost(&mut self, cost_id: &str) -> bool {
        self.costs.remove(cost_id).is_some()
    }

    /// Add a cell to a registered cost area. Returns false if the area is
    /// unknown.
    pub fn add_cost_cell(&mut self, cost_id: &str, cell: ModelCoordinate) -> bool {
        match self.costs.get_mut(cost_id) {
            Some(area) => {
                area.cells.insert(cell.with_z(0));
                true
            }
            None => false,
        }
    }

    pub fn remove_cost_cell(&mut self, cost_id: &str, cell: ModelCoordinate) -> bool {
        self.costs
            .get_mut(cost_id)
            .is_some_and(|area| area.cells.remove(&cell.with_z(0)))
    }

    /// Multiplier for entering `cell` under `cost_id`; 1 outside the area.
    pub fn cost_multiplier(&self, cost_id: &str, cell: ModelCoordinate) -> f64 {
        match self.costs.get(cost_id) {
            Some(area) if area.cells.contains(&cell.with_z(0)) => area.multiplier,
            _ => 1.0,
        }
    }

    // ---- areas ------------------------------------------------------------

    /// Add a cell to the named area, creating the area on first use.
    pub fn add_area_cell(&mut self, area: impl Into<String>, cell: ModelCoordinate) {
        self.areas.entry(area.into()).or_default().insert(cell.with_z(0));
    }

    pub fn remove_area_cell(&mut self, area: &str, cell: ModelCoordinate) -> bool {
        let Some(cells) = self.areas.get_mut(area) else {
            return false;
        };
        let removed = cells.remove(&cell.with_z(0));
        if cells.is_empty() {
            self.areas.remove(area);
        }
        removed
    }

    pub fn is_cell_in_area(&self, area: &str, cell: ModelCoordinate) -> bool {
        self.areas
            .get(area)
            .is_some_and(|cells| cells.contains(&cell.with_z(0)))
    }

    // ---- heights ----------------------------------------------------------

    /// Ground height of a cell, used by routes with a z-step limit.
    pub fn set_cell_height(&mut self, cell: ModelCoordinate, height: i32) {
        if height == 0 {
            self.heights.remove(&cell.with_z(0));
        } else {
            self.heights.insert(cell.with_z(0), height);
        }
    }

    /// Ground height of `cell`; 0 unless set.
    pub fn cell_height(&self, cell: ModelCoordinate) -> i32 {
        self.heights.get(&cell.with_z(0)).copied().unwrap_or(0)
    }
}
