//! Incremental best-first route search.
//!
//! A [`Search`] is a state machine advanced one step at a time by
//! [`Search::update_search`]. Each step pops the best frontier cell,
//! finalizes it in the shortest-path tree and relaxes its accessible
//! neighbours. The route is split into one or more [`Leg`]s, each searched
//! on a single layer; the [`Traversal`] strategy decides which legs there
//! are:
//!
//! | Traversal | Legs |
//! |---|---|
//! | [`SingleLayer`] | start to end on one layer |
//! | [`MultiLayer`] | one leg per layer, joined by transitions |
//!
//! Legs are searched in order and their paths concatenated.
//!
//! A neighbour is entered only if the route's constraints allow it: the
//! height step, blockers (optionally only static ones), limited areas, and
//! for multi-cell agents every cell of the footprint.

use std::collections::BTreeSet;
use std::iter;
use std::mem;
use std::rc::Rc;

use log::trace;
use tileroute_core::{Layer, Location, Map, ModelCoordinate};

use crate::error::PathError;
use crate::heuristic::{Heuristic, heuristic_for};
use crate::priority_queue::{PriorityQueue, QueueOrder};
use crate::route::{Path, Route};
use crate::search_space::{SearchSpace, SearchSpaceCache};
use crate::session::SessionId;

mod multi;
mod single;

pub use multi::{Hop, MultiLayer};
pub use single::SingleLayer;

/// State of a search. Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    Incomplete,
    Complete,
    Failed,
}

// ---------------------------------------------------------------------------
// Leg
// ---------------------------------------------------------------------------

/// One single-layer stretch of a route.
#[derive(Debug, Clone)]
pub struct Leg {
    from: Location,
    to: Location,
    space: Rc<SearchSpace>,
    heuristic: &'static dyn Heuristic,
}

impl Leg {
    /// Fails if no heuristic matches the grid type of `space`.
    pub fn new(from: Location, to: Location, space: Rc<SearchSpace>) -> Result<Self, PathError> {
        let heuristic = heuristic_for(space.grid().grid_type())?;
        Ok(Self {
            from,
            to,
            space,
            heuristic,
        })
    }

    pub fn from(&self) -> &Location {
        &self.from
    }

    pub fn to(&self) -> &Location {
        &self.to
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }
}

/// Supplies the legs of a route, in walking order.
pub trait Traversal {
    /// The next leg to search, or `None` once every leg has been handed out.
    fn next_leg(&mut self) -> Option<Leg>;

    /// Legs not handed out yet.
    fn remaining_legs(&self) -> usize;
}

// ---------------------------------------------------------------------------
// LegSearch: A* state for one leg
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LegSearch {
    leg: Leg,
    start: Option<usize>,
    dest: Option<usize>,
    dest_cell: ModelCoordinate,
    /// Finalized predecessor of each cell. The start is its own predecessor.
    spt: Vec<Option<usize>>,
    /// Best known predecessor of each discovered cell.
    sf: Vec<Option<usize>>,
    g_costs: Vec<f64>,
    frontier: PriorityQueue<usize>,
    nbuf: Vec<ModelCoordinate>,
    /// Flat cells of a multi-cell agent's footprint at the leg start.
    ignored: BTreeSet<ModelCoordinate>,
}

impl LegSearch {
    /// Seed the frontier with the start cell unless it is blocked or outside
    /// the search space. An empty frontier fails on the first step.
    ///
    /// A multi-cell agent never blocks itself: the cells it covers at the
    /// start are not treated as blockers during this leg.
    fn new(leg: Leg, map: &Map, route: &Route) -> Self {
        let space = Rc::clone(&leg.space);
        let len = space.len();
        let start_cell = space.cell_of(&leg.from);
        let dest_cell = space.cell_of(&leg.to);
        let start = space.coord_to_int(start_cell);
        let dest = space.coord_to_int(dest_cell);

        let mut search = Self {
            leg,
            start,
            dest,
            dest_cell,
            spt: vec![None; len],
            sf: vec![None; len],
            g_costs: vec![0.0; len],
            frontier: PriorityQueue::new(QueueOrder::Ascending),
            nbuf: Vec::with_capacity(9),
            ignored: BTreeSet::new(),
        };

        if route.is_multi_cell() {
            search.ignored = footprint(&space, start_cell, route)
                .map(|p| p.with_z(0))
                .collect();
        }
        let blocked = map.layer(space.layer()).is_none_or(|layer| {
            !route.is_multi_cell() && layer.cell_blocks(start_cell, route.ignores_dynamic_blockers())
        });
        if let (Some(s), false) = (start, blocked) {
            search.frontier.push(s, 0.0);
            search.sf[s] = Some(s);
        }
        search
    }

    fn step(&mut self, map: &Map, route: &Route) -> SearchStatus {
        let Some((next, f)) = self.frontier.pop_best() else {
            return SearchStatus::Failed;
        };
        self.spt[next] = self.sf[next];
        if Some(next) == self.dest {
            return SearchStatus::Complete;
        }
        let Some(layer) = map.layer(self.leg.space.layer()) else {
            return SearchStatus::Failed;
        };

        let space = &self.leg.space;
        let grid = space.grid();
        let cur = space.int_to_coord(next);
        trace!("{}: pop {cur} f={f:.3} g={:.3}", space.layer(), self.g_costs[next]);

        let cur_height = layer.cell_height(cur);
        let mut nbuf = mem::take(&mut self.nbuf);
        grid.accessible_coordinates(cur, &mut nbuf);
        for &np in nbuf.iter() {
            let Some(ni) = space.coord_to_int(np) else {
                continue;
            };
            // `next` was finalized above and is never the destination here.
            if ni == next || self.spt[ni].is_some() {
                continue;
            }
            if route
                .z_step_limit()
                .is_some_and(|limit| cur_height.abs_diff(layer.cell_height(np)) > limit)
            {
                continue;
            }
            if !self.can_enter(layer, np, Some(ni) == self.dest, route) {
                continue;
            }
            let multiplier = route.cost_id().map_or(1.0, |id| layer.cost_multiplier(id, np));
            let g = self.g_costs[next] + grid.adjacent_cost(cur, np) * multiplier;
            let h = self.leg.heuristic.calculate(np, self.dest_cell);
            match self.sf[ni] {
                None => {
                    self.frontier.push(ni, g + h);
                    self.g_costs[ni] = g;
                    self.sf[ni] = Some(next);
                }
                Some(_) if g < self.g_costs[ni] => {
                    self.frontier.change_priority(ni, g + h);
                    self.g_costs[ni] = g;
                    self.sf[ni] = Some(next);
                }
                Some(_) => {}
            }
        }
        self.nbuf = nbuf;
        SearchStatus::Incomplete
    }

    /// Whether the agent of `route` may stand on `cell`. A single-cell agent
    /// may always enter the destination, even when it is blocked.
    fn can_enter(&self, layer: &Layer, cell: ModelCoordinate, is_dest: bool, route: &Route) -> bool {
        let ignore_dynamic = route.ignores_dynamic_blockers();
        if !route.is_multi_cell() {
            if layer.cell_blocks(cell, ignore_dynamic) && !is_dest {
                return false;
            }
            return in_limited_areas(layer, cell, route);
        }
        let space = &self.leg.space;
        footprint(space, cell, route).all(|p| {
            space.coord_to_int(p).is_some()
                && (self.ignored.contains(&p.with_z(0)) || !layer.cell_blocks(p, ignore_dynamic))
                && in_limited_areas(layer, p, route)
        })
    }

    /// Walk the shortest-path tree back from the destination. The last
    /// waypoint sits on the destination cell centre, the first keeps the
    /// exact start position.
    fn calc_path(&self) -> Option<Vec<Location>> {
        let (start, dest) = (self.start?, self.dest?);
        let layer = self.leg.space.layer();
        let mut nodes = vec![Location::new(layer, self.dest_cell)];
        let mut cur = dest;
        while cur != start {
            cur = self.spt[cur]?;
            nodes.push(Location::new(layer, self.leg.space.int_to_coord(cur)));
        }
        nodes.reverse();
        if let Some(first) = nodes.first_mut() {
            first.set_exact_layer_coordinates(self.leg.from.exact_layer_coordinates());
        }
        Some(nodes)
    }
}

/// The anchor cell followed by the cells covered by the agent of `route`.
fn footprint(
    space: &SearchSpace,
    anchor: ModelCoordinate,
    route: &Route,
) -> impl Iterator<Item = ModelCoordinate> {
    let covered = if route.is_multi_cell() {
        space.grid().to_multi_coordinates(anchor, route.occupied_cells(), false)
    } else {
        Vec::new()
    };
    iter::once(anchor).chain(covered)
}

fn in_limited_areas(layer: &Layer, cell: ModelCoordinate, route: &Route) -> bool {
    !route.is_area_limited()
        || route
            .limited_areas()
            .iter()
            .any(|area| layer.is_cell_in_area(area, cell))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// A resumable route search over the legs supplied by `T`.
#[derive(Debug)]
pub struct Search<T> {
    session: SessionId,
    route: Route,
    traversal: T,
    leg: Option<LegSearch>,
    nodes: Vec<Location>,
    status: SearchStatus,
    steps: usize,
}

impl<T: Traversal> Search<T> {
    pub fn new(session: SessionId, route: &Route, mut traversal: T, map: &Map) -> Self {
        let leg = traversal.next_leg().map(|leg| LegSearch::new(leg, map, route));
        Self {
            session,
            route: route.clone(),
            traversal,
            leg,
            nodes: Vec::new(),
            status: SearchStatus::Incomplete,
            steps: 0,
        }
    }

    /// Run one step. Calling this after a terminal state is a no-op that
    /// returns that state.
    pub fn update_search(&mut self, map: &Map) -> SearchStatus {
        if self.status != SearchStatus::Incomplete {
            return self.status;
        }
        let Some(leg) = self.leg.as_mut() else {
            self.status = SearchStatus::Failed;
            return self.status;
        };
        self.steps += 1;
        match leg.step(map, &self.route) {
            SearchStatus::Incomplete => {}
            SearchStatus::Failed => self.status = SearchStatus::Failed,
            SearchStatus::Complete => match leg.calc_path() {
                Some(nodes) => {
                    self.nodes.extend(nodes);
                    self.leg = self
                        .traversal
                        .next_leg()
                        .map(|leg| LegSearch::new(leg, map, &self.route));
                    if self.leg.is_none() {
                        self.status = SearchStatus::Complete;
                    }
                }
                None => self.status = SearchStatus::Failed,
            },
        }
        self.status
    }

    /// The found path. `None` unless the search is complete.
    pub fn calc_path(&self) -> Option<Path> {
        (self.status == SearchStatus::Complete).then(|| Path::new(self.nodes.iter().copied()))
    }

    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    #[inline]
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn from(&self) -> &Location {
        self.route.start()
    }

    pub fn to(&self) -> &Location {
        self.route.end()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Steps run so far, across all legs.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn traversal(&self) -> &T {
        &self.traversal
    }
}

// ---------------------------------------------------------------------------
// RouteSearch
// ---------------------------------------------------------------------------

/// A search with its traversal picked from the route: multi-layer when the
/// endpoints are on different layers.
#[derive(Debug)]
pub enum RouteSearch {
    Single(Search<SingleLayer>),
    Multi(Search<MultiLayer>),
}

impl RouteSearch {
    pub fn new(
        session: SessionId,
        route: &Route,
        map: &Map,
        spaces: &mut SearchSpaceCache,
    ) -> Result<Self, PathError> {
        if route.is_multi_layer() {
            let traversal = MultiLayer::plan(route, map, spaces)?;
            Ok(Self::Multi(Search::new(session, route, traversal, map)))
        } else {
            let traversal = SingleLayer::new(route, map, spaces)?;
            Ok(Self::Single(Search::new(session, route, traversal, map)))
        }
    }

    pub fn update_search(&mut self, map: &Map) -> SearchStatus {
        match self {
            Self::Single(s) => s.update_search(map),
            Self::Multi(s) => s.update_search(map),
        }
    }

    pub fn calc_path(&self) -> Option<Path> {
        match self {
            Self::Single(s) => s.calc_path(),
            Self::Multi(s) => s.calc_path(),
        }
    }

    pub fn status(&self) -> SearchStatus {
        match self {
            Self::Single(s) => s.status(),
            Self::Multi(s) => s.status(),
        }
    }

    pub fn steps(&self) -> usize {
        match self {
            Self::Single(s) => s.steps(),
            Self::Multi(s) => s.steps(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::SessionArena;
    use tileroute_core::{CellGrid, ExactModelCoordinate, HexGrid, Instance, LayerId, Range, SquareGrid};

    pub(crate) fn c(x: i32, y: i32) -> ModelCoordinate {
        ModelCoordinate::new(x, y)
    }

    pub(crate) fn session() -> SessionId {
        SessionArena::default().insert(())
    }

    /// `w`x`h` square layer (no diagonals) with blockers on `walls`.
    pub(crate) fn square_map(w: i32, h: i32, walls: &[(i32, i32)]) -> Map {
        let mut map = Map::new("test");
        let id = map.add_layer("ground", Box::new(SquareGrid::new(false)), Range::sized(w, h));
        let layer = map.layer_mut(id).unwrap();
        for &(x, y) in walls {
            layer.add_instance(Instance::new(format!("wall{x}_{y}"), Location::new(id, c(x, y)), true));
        }
        map
    }

    fn route(from: ModelCoordinate, to: ModelCoordinate) -> Route {
        Route::new(Location::new(LayerId(0), from), Location::new(LayerId(0), to))
    }

    fn run_route(map: &Map, route: &Route) -> (SearchStatus, Option<Path>) {
        let mut spaces = SearchSpaceCache::new();
        let mut search = RouteSearch::new(session(), route, map, &mut spaces).unwrap();
        for _ in 0..10_000 {
            if search.update_search(map) != SearchStatus::Incomplete {
                break;
            }
        }
        (search.status(), search.calc_path())
    }

    fn run(map: &Map, from: ModelCoordinate, to: ModelCoordinate) -> (SearchStatus, Option<Path>) {
        run_route(map, &route(from, to))
    }

    fn cells(path: &Path) -> Vec<ModelCoordinate> {
        path.iter().map(|l| l.layer_coordinates()).collect()
    }

    #[test]
    fn detours_around_a_blocker() {
        let map = square_map(5, 5, &[(2, 2)]);
        let (status, path) = run(&map, c(0, 2), c(4, 2));
        assert_eq!(status, SearchStatus::Complete);
        let path = path.unwrap();
        let cells = cells(&path);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells.first(), Some(&c(0, 2)));
        assert_eq!(cells.last(), Some(&c(4, 2)));
        assert!(!cells.contains(&c(2, 2)));
        assert!(cells.contains(&c(2, 1)) || cells.contains(&c(2, 3)));
        let grid = SquareGrid::new(false);
        for w in cells.windows(2) {
            assert!(grid.is_accessible_orthogonal(w[0], w[1]));
        }
    }

    #[test]
    fn straight_line_without_blockers() {
        let map = square_map(5, 5, &[]);
        let (_, path) = run(&map, c(0, 2), c(4, 2));
        assert_eq!(cells(&path.unwrap()), (0..5).map(|x| c(x, 2)).collect::<Vec<_>>());
    }

    #[test]
    fn unreachable_destination_exhausts_the_frontier() {
        let walls: Vec<_> = (0..5).map(|y| (2, y)).collect();
        let map = square_map(5, 5, &walls);
        let (status, path) = run(&map, c(0, 0), c(4, 4));
        assert_eq!(status, SearchStatus::Failed);
        assert!(path.is_none());
    }

    #[test]
    fn blocked_start_fails_on_first_step() {
        let map = square_map(5, 5, &[(0, 0)]);
        let route = Route::new(Location::new(LayerId(0), c(0, 0)), Location::new(LayerId(0), c(3, 3)));
        let mut spaces = SearchSpaceCache::new();
        let mut search = RouteSearch::new(session(), &route, &map, &mut spaces).unwrap();
        assert_eq!(search.update_search(&map), SearchStatus::Failed);
        assert_eq!(search.steps(), 1);
        // Terminal states are sticky.
        assert_eq!(search.update_search(&map), SearchStatus::Failed);
        assert_eq!(search.steps(), 1);
    }

    #[test]
    fn start_outside_the_search_space_fails() {
        let map = square_map(5, 5, &[]);
        let (status, _) = run(&map, c(-3, 0), c(3, 3));
        assert_eq!(status, SearchStatus::Failed);
    }

    #[test]
    fn blocked_destination_can_still_be_entered() {
        let map = square_map(5, 5, &[(4, 4)]);
        let (status, path) = run(&map, c(0, 4), c(4, 4));
        assert_eq!(status, SearchStatus::Complete);
        assert_eq!(path.unwrap().len(), 5);
    }

    #[test]
    fn first_waypoint_keeps_exact_start() {
        let map = square_map(5, 5, &[]);
        let start = Location::from_exact(LayerId(0), tileroute_core::ExactModelCoordinate::new(0.3, 1.8));
        let route = Route::new(start, Location::new(LayerId(0), c(3, 2)));
        let mut spaces = SearchSpaceCache::new();
        let mut search = RouteSearch::new(session(), &route, &map, &mut spaces).unwrap();
        while search.update_search(&map) == SearchStatus::Incomplete {}
        let path = search.calc_path().unwrap();
        assert_eq!(path.front(), Some(&start));
        assert_eq!(path.back(), Some(&Location::new(LayerId(0), c(3, 2))));
    }

    #[test]
    fn cost_area_steers_the_route() {
        let mut map = square_map(5, 3, &[]);
        let layer = map.layer_mut(LayerId(0)).unwrap();
        layer.register_cost("mud", 10.0);
        for x in 1..4 {
            layer.add_cost_cell("mud", c(x, 1));
        }
        let from = Location::new(LayerId(0), c(0, 1));
        let to = Location::new(LayerId(0), c(4, 1));
        let mut spaces = SearchSpaceCache::new();

        let plain = Route::new(from, to);
        let mut search = RouteSearch::new(session(), &plain, &map, &mut spaces).unwrap();
        while search.update_search(&map) == SearchStatus::Incomplete {}
        assert_eq!(search.calc_path().unwrap().len(), 5);

        let muddy = Route::new(from, to).with_cost_id("mud");
        let mut search = RouteSearch::new(session(), &muddy, &map, &mut spaces).unwrap();
        while search.update_search(&map) == SearchStatus::Incomplete {}
        let path = search.calc_path().unwrap();
        assert_eq!(path.len(), 7);
        assert!(cells(&path)[1..6].iter().all(|p| p.y != 1));
    }

    #[test]
    fn repeated_searches_are_identical() {
        let map = square_map(8, 8, &[(3, 3), (3, 4), (4, 3), (5, 5)]);
        let (_, first) = run(&map, c(0, 0), c(7, 7));
        for _ in 0..5 {
            let (_, again) = run(&map, c(0, 0), c(7, 7));
            assert_eq!(again, first);
        }
    }

    #[test]
    fn elevated_blocker_still_blocks_its_cell() {
        let mut map = square_map(5, 5, &[]);
        let crate_on_shelf = Location::from_exact(LayerId(0), ExactModelCoordinate::new_3d(2.0, 2.0, 1.0));
        map.layer_mut(LayerId(0))
            .unwrap()
            .add_instance(Instance::new("crate", crate_on_shelf, true));
        let (status, path) = run(&map, c(0, 2), c(4, 2));
        assert_eq!(status, SearchStatus::Complete);
        let cells = cells(&path.unwrap());
        assert_eq!(cells.len(), 7);
        assert!(!cells.contains(&c(2, 2)));
    }

    #[test]
    fn z_step_limit_refuses_steep_steps() {
        let mut map = square_map(5, 3, &[]);
        let layer = map.layer_mut(LayerId(0)).unwrap();
        for y in 0..3 {
            layer.set_cell_height(c(2, y), 2);
        }
        layer.set_cell_height(c(1, 0), 1);
        layer.set_cell_height(c(3, 0), 1);

        let (status, path) = run_route(&map, &route(c(0, 1), c(4, 1)).with_z_step_limit(1));
        assert_eq!(status, SearchStatus::Complete);
        let cells = cells(&path.unwrap());
        assert!(cells.contains(&c(1, 0)) && cells.contains(&c(2, 0)) && cells.contains(&c(3, 0)));

        map.layer_mut(LayerId(0)).unwrap().set_cell_height(c(3, 0), 0);
        let (status, _) = run_route(&map, &route(c(0, 1), c(4, 1)).with_z_step_limit(1));
        assert_eq!(status, SearchStatus::Failed);
        let (status, path) = run_route(&map, &route(c(0, 1), c(4, 1)).with_z_step_limit(2));
        assert_eq!(status, SearchStatus::Complete);
        assert_eq!(path.unwrap().len(), 5);
    }

    #[test]
    fn limited_areas_confine_the_route() {
        let mut map = square_map(5, 3, &[]);
        let layer = map.layer_mut(LayerId(0)).unwrap();
        for x in 0..5 {
            layer.add_area_cell("road", c(x, 0));
        }
        layer.add_area_cell("yard", c(0, 1));
        layer.add_area_cell("yard", c(4, 1));

        let (_, free) = run(&map, c(0, 1), c(4, 1));
        assert_eq!(free.unwrap().len(), 5);

        let confined = route(c(0, 1), c(4, 1)).with_limited_areas(["road", "yard"]);
        let (status, path) = run_route(&map, &confined);
        assert_eq!(status, SearchStatus::Complete);
        let cells = cells(&path.unwrap());
        assert_eq!(cells.len(), 7);
        assert!(cells[1..6].iter().all(|p| p.y == 0));

        let (status, _) = run_route(&map, &route(c(0, 1), c(4, 1)).with_limited_areas(["road"]));
        assert_eq!(status, SearchStatus::Failed);
    }

    #[test]
    fn dynamic_blockers_can_be_walked_through() {
        let walls: Vec<_> = (0..5).map(|y| (2, y)).collect();
        let mut map = square_map(5, 5, &walls);
        let (status, _) = run(&map, c(0, 2), c(4, 2));
        assert_eq!(status, SearchStatus::Failed);

        let pushy = route(c(0, 2), c(4, 2)).with_ignore_dynamic_blockers(true);
        let (status, path) = run_route(&map, &pushy);
        assert_eq!(status, SearchStatus::Complete);
        assert_eq!(path.unwrap().len(), 5);

        map.layer_mut(LayerId(0))
            .unwrap()
            .add_instance(Instance::new("wall2_2", Location::new(LayerId(0), c(2, 2)), true).with_static(true));
        let (status, path) = run_route(&map, &pushy);
        assert_eq!(status, SearchStatus::Complete);
        let cells = cells(&path.unwrap());
        assert_eq!(cells.len(), 7);
        assert!(!cells.contains(&c(2, 2)));
    }

    #[test]
    fn multi_cell_agent_needs_room_for_its_footprint() {
        // Two cells tall: the anchor plus the cell below it.
        let tall = |map: &Map| run_route(map, &route(c(0, 0), c(4, 2)).with_occupied_cells([c(0, 1)]));
        let mut map = square_map(6, 4, &[(2, 0), (2, 1)]);
        // The agent's own body at the start is not an obstacle.
        map.layer_mut(LayerId(0))
            .unwrap()
            .add_instance(Instance::new("body", Location::new(LayerId(0), c(0, 1)), true));

        let (status, path) = tall(&map);
        assert_eq!(status, SearchStatus::Complete);
        let layer = map.layer(LayerId(0)).unwrap();
        for p in cells(&path.unwrap()) {
            assert!(p.y < 3, "footprint of {p} leaves the layer");
            assert!(!layer.cell_contains_blocking_instance(p) || p == c(0, 1) || p == c(0, 0));
            assert!(!layer.cell_contains_blocking_instance(c(p.x, p.y + 1)) || c(p.x, p.y + 1) == c(0, 1));
        }

        // A one-cell gap lets a single-cell agent through but not a tall one.
        map.layer_mut(LayerId(0))
            .unwrap()
            .add_instance(Instance::new("wall2_3", Location::new(LayerId(0), c(2, 3)), true));
        assert_eq!(tall(&map).0, SearchStatus::Failed);
        assert_eq!(run(&map, c(0, 0), c(4, 2)).0, SearchStatus::Complete);
    }

    #[test]
    fn hex_route_goes_around_a_wall() {
        let mut map = Map::new("hex");
        let id = map.add_layer("ground", Box::new(HexGrid::new()), Range::sized(8, 8));
        let layer = map.layer_mut(id).unwrap();
        let walls: Vec<_> = (0..=6).map(|y| c(4, y)).collect();
        for &w in &walls {
            layer.add_instance(Instance::new(format!("wall{}", w.y), Location::new(id, w), true));
        }

        let (status, path) = run(&map, c(0, 3), c(7, 3));
        assert_eq!(status, SearchStatus::Complete);
        let cells = cells(&path.unwrap());
        assert_eq!(cells.first(), Some(&c(0, 3)));
        assert_eq!(cells.last(), Some(&c(7, 3)));
        let grid = HexGrid::new();
        for w in cells.windows(2) {
            assert!(grid.is_accessible(w[0], w[1]), "{} -> {} is not a hex step", w[0], w[1]);
        }
        assert!(cells.iter().all(|p| !walls.contains(p)));
        assert!(cells.contains(&c(4, 7)));
    }
}
