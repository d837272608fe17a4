//! Route requests and the paths that answer them.

use std::collections::VecDeque;

use tileroute_core::{Location, ModelCoordinate};

/// An immutable route request.
///
/// Besides the endpoints a route carries the movement constraints of the
/// agent that walks it. See the `with_*` builders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    start: Location,
    end: Location,
    cost_id: Option<String>,
    immediate: bool,
    z_step_limit: Option<u32>,
    limited_areas: Vec<String>,
    ignore_dynamic_blockers: bool,
    // Offsets from the anchor cell; empty for single cell agents.
    occupied_cells: Vec<ModelCoordinate>,
}

impl Route {
    pub fn new(start: Location, end: Location) -> Self {
        Self {
            start,
            end,
            cost_id: None,
            immediate: false,
            z_step_limit: None,
            limited_areas: Vec::new(),
            ignore_dynamic_blockers: false,
            occupied_cells: Vec::new(),
        }
    }

    /// Weigh steps with the cost area registered under `cost_id`.
    pub fn with_cost_id(mut self, cost_id: impl Into<String>) -> Self {
        self.cost_id = Some(cost_id.into());
        self
    }

    /// Solve synchronously instead of through the update queue.
    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Refuse steps between cells whose heights differ by more than `limit`.
    pub fn with_z_step_limit(mut self, limit: u32) -> Self {
        self.z_step_limit = Some(limit);
        self
    }

    /// Only enter cells that belong to one of `areas`.
    pub fn with_limited_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.limited_areas = areas.into_iter().map(Into::into).collect();
        self
    }

    /// Walk through blocking instances that are not static.
    pub fn with_ignore_dynamic_blockers(mut self, ignore: bool) -> Self {
        self.ignore_dynamic_blockers = ignore;
        self
    }

    /// Cells covered by the agent, as offsets from the cell it stands on.
    /// The anchor cell itself is always covered.
    pub fn with_occupied_cells(mut self, offsets: impl IntoIterator<Item = ModelCoordinate>) -> Self {
        self.occupied_cells = offsets.into_iter().collect();
        self
    }

    #[inline]
    pub fn start(&self) -> &Location {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Location {
        &self.end
    }

    pub fn cost_id(&self) -> Option<&str> {
        self.cost_id.as_deref()
    }

    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    #[inline]
    pub fn z_step_limit(&self) -> Option<u32> {
        self.z_step_limit
    }

    pub fn limited_areas(&self) -> &[String] {
        &self.limited_areas
    }

    #[inline]
    pub fn is_area_limited(&self) -> bool {
        !self.limited_areas.is_empty()
    }

    #[inline]
    pub fn ignores_dynamic_blockers(&self) -> bool {
        self.ignore_dynamic_blockers
    }

    pub fn occupied_cells(&self) -> &[ModelCoordinate] {
        &self.occupied_cells
    }

    #[inline]
    pub fn is_multi_cell(&self) -> bool {
        !self.occupied_cells.is_empty()
    }

    /// Whether start and end lie on different layers.
    #[inline]
    pub fn is_multi_layer(&self) -> bool {
        self.start.layer() != self.end.layer()
    }
}

/// Lifecycle of a route session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteStatus {
    /// Queued, not serviced yet.
    Created,
    /// At least one search step has run.
    Searching,
    /// A path was found and is waiting to be followed.
    Searched,
    /// The path has been walked to its end.
    Solved,
    /// No route exists. The session is dropped by the next update.
    Failed,
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// Ordered waypoints, front first, plus a count of the waypoints already
/// walked past.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    nodes: VecDeque<Location>,
    walked: usize,
}

impl Path {
    pub fn new(nodes: impl IntoIterator<Item = Location>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            walked: 0,
        }
    }

    /// Number of waypoints still ahead.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of waypoints popped so far.
    #[inline]
    pub fn walked_len(&self) -> usize {
        self.walked
    }

    /// The next waypoint.
    #[inline]
    pub fn front(&self) -> Option<&Location> {
        self.nodes.front()
    }

    /// The final waypoint.
    #[inline]
    pub fn back(&self) -> Option<&Location> {
        self.nodes.back()
    }

    pub fn pop_front(&mut self) -> Option<Location> {
        let node = self.nodes.pop_front()?;
        self.walked += 1;
        Some(node)
    }

    /// Keep only the next `length` waypoints.
    pub fn cut(&mut self, length: usize) {
        self.nodes.truncate(length);
    }

    /// Whether every waypoint has been walked.
    #[inline]
    pub fn reached_end(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.nodes.iter()
    }
}

impl FromIterator<Location> for Path {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Location;
    type IntoIter = std::collections::vec_deque::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use tileroute_core::{LayerId, ModelCoordinate};

    #[test]
    fn path_round_trip() {
        let path: Path = (0..3)
            .map(|x| Location::new(LayerId(0), ModelCoordinate::new(x, 1)))
            .collect();
        let json = serde_json::to_string(&path).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, back);
    }
}
