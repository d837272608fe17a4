//! Routes across layers.
//!
//! Before any cell is searched, the route is planned on zones: which
//! transitions ("between targets") it passes through. Two planners run in
//! turn:
//!
//! 1. Neighbour plan: a single transition from the start zone straight into
//!    the end zone, the one minimising the distance walked on both sides.
//! 2. Zone plan: a shortest chain of zones linked by transitions, each
//!    transition counting as one unit; between two zones the transition
//!    closest to the previous waypoint is used.
//!
//! Each stretch between two between-targets then becomes a single-layer
//! [`Leg`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::{debug, warn};
use tileroute_core::{LayerId, Location, Map, Transition};

use super::{Leg, Traversal};
use crate::error::PathError;
use crate::priority_queue::{PriorityQueue, QueueOrder};
use crate::route::Route;
use crate::search_space::SearchSpaceCache;
use crate::zones::{Zone, Zones};

/// A transition together with the layer it leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub layer: LayerId,
    pub transition: Transition,
}

impl Hop {
    /// Where the route leaves `layer`.
    pub fn exit(&self) -> Location {
        Location::new(self.layer, self.transition.from)
    }

    /// Where the route arrives on the next layer.
    pub fn entry(&self) -> Location {
        Location::new(self.transition.to_layer, self.transition.to)
    }
}

#[derive(Debug)]
pub struct MultiLayer {
    legs: VecDeque<Leg>,
    hops: Vec<Hop>,
}

impl MultiLayer {
    /// Plan the route. A route with no plan yields no legs, and its search
    /// fails on the first step.
    pub fn plan(route: &Route, map: &Map, spaces: &mut SearchSpaceCache) -> Result<Self, PathError> {
        let (start, end) = (route.start(), route.end());
        for layer in [start.layer(), end.layer()] {
            map.layer(layer).ok_or(PathError::UnknownLayer(layer))?;
        }

        let zones = Zones::build(map, spaces)?;
        let all_hops = all_hops(map);
        let hops = match (zones.zone_of(start), zones.zone_of(end)) {
            (Some(a), Some(b)) if a == b => Some(Vec::new()),
            (Some(a), Some(b)) => neighbour_plan(&all_hops, &zones, start, end, a, b)
                .map(|hop| vec![hop])
                .or_else(|| zone_plan(&all_hops, &zones, start, a, b)),
            _ => None,
        };
        let Some(hops) = hops else {
            warn!("no between targets from {start} to {end}");
            return Ok(Self {
                legs: VecDeque::new(),
                hops: Vec::new(),
            });
        };
        debug!("route {start} -> {end}: {} between targets", hops.len());

        let mut legs = VecDeque::with_capacity(hops.len() + 1);
        let mut cur = *start;
        for hop in &hops {
            let space = spaces.get_or_create(map, hop.layer)?;
            legs.push_back(Leg::new(cur, hop.exit(), space)?);
            cur = hop.entry();
        }
        let space = spaces.get_or_create(map, end.layer())?;
        legs.push_back(Leg::new(cur, *end, space)?);
        Ok(Self { legs, hops })
    }

    /// The transitions the route passes through, in order.
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }
}

impl Traversal for MultiLayer {
    fn next_leg(&mut self) -> Option<Leg> {
        self.legs.pop_front()
    }

    fn remaining_legs(&self) -> usize {
        self.legs.len()
    }
}

/// Every transition of the map, in layer then insertion order.
fn all_hops(map: &Map) -> Vec<Hop> {
    map.layers()
        .iter()
        .flat_map(|layer| {
            layer.transitions().iter().map(|&transition| Hop {
                layer: layer.id(),
                transition,
            })
        })
        .collect()
}

fn hop_zones(zones: &Zones, hop: &Hop) -> Option<(Zone, Zone)> {
    let from = zones.zone_at(hop.layer, hop.transition.from)?;
    let to = zones.zone_at(hop.transition.to_layer, hop.transition.to)?;
    Some((from, to))
}

fn neighbour_plan(
    hops: &[Hop],
    zones: &Zones,
    start: &Location,
    end: &Location,
    start_zone: Zone,
    end_zone: Zone,
) -> Option<Hop> {
    let mut best: Option<(f64, Hop)> = None;
    for hop in hops {
        if hop_zones(zones, hop) != Some((start_zone, end_zone)) {
            continue;
        }
        let dist = start.layer_distance_to(&hop.exit()) + hop.entry().layer_distance_to(end);
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, *hop));
        }
    }
    best.map(|(_, hop)| hop)
}

fn zone_plan(
    hops: &[Hop],
    zones: &Zones,
    start: &Location,
    start_zone: Zone,
    end_zone: Zone,
) -> Option<Vec<Hop>> {
    let mut edges: BTreeMap<Zone, Vec<Zone>> = BTreeMap::new();
    for (from, to) in hops.iter().filter_map(|hop| hop_zones(zones, hop)) {
        let out = edges.entry(from).or_default();
        if from != to && !out.contains(&to) {
            out.push(to);
        }
    }

    // Best-first over zones, one unit per transition.
    let mut frontier = PriorityQueue::new(QueueOrder::Ascending);
    let mut costs: BTreeMap<Zone, f64> = BTreeMap::new();
    let mut prev: BTreeMap<Zone, Zone> = BTreeMap::new();
    let mut done: BTreeSet<Zone> = BTreeSet::new();
    frontier.push(start_zone, 0.0);
    costs.insert(start_zone, 0.0);
    while let Some((zone, cost)) = frontier.pop_best() {
        done.insert(zone);
        if zone == end_zone {
            break;
        }
        for &next in edges.get(&zone).into_iter().flatten() {
            if done.contains(&next) {
                continue;
            }
            let c = cost + 1.0;
            match costs.get(&next) {
                None => {
                    frontier.push(next, c);
                }
                Some(&old) if c < old => {
                    frontier.change_priority(next, c);
                }
                Some(_) => continue,
            }
            costs.insert(next, c);
            prev.insert(next, zone);
        }
    }
    if !done.contains(&end_zone) {
        return None;
    }

    let mut chain = vec![end_zone];
    let mut cur = end_zone;
    while cur != start_zone {
        cur = *prev.get(&cur)?;
        chain.push(cur);
    }
    chain.reverse();

    let mut last = *start;
    let mut plan = Vec::with_capacity(chain.len() - 1);
    for pair in chain.windows(2) {
        let mut best: Option<(f64, Hop)> = None;
        for hop in hops {
            if hop_zones(zones, hop) != Some((pair[0], pair[1])) {
                continue;
            }
            let dist = last.layer_distance_to(&hop.exit());
            if best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, *hop));
            }
        }
        let (_, hop) = best?;
        last = hop.entry();
        plan.push(hop);
    }
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::{c, session};
    use crate::search::{RouteSearch, SearchStatus};
    use tileroute_core::{Instance, Range, SquareGrid};

    fn layered(n: usize) -> Map {
        let mut map = Map::new("tower");
        for i in 0..n {
            map.add_layer(format!("floor{i}"), Box::new(SquareGrid::new(false)), Range::sized(5, 5));
        }
        map
    }

    fn stairs(map: &mut Map, layer: usize, from: (i32, i32), to_layer: usize, to: (i32, i32)) {
        map.layer_mut(LayerId(layer)).unwrap().add_transition(Transition {
            from: c(from.0, from.1),
            to_layer: LayerId(to_layer),
            to: c(to.0, to.1),
        });
    }

    fn solve(map: &Map, route: &Route) -> (SearchStatus, Option<crate::route::Path>) {
        let mut spaces = SearchSpaceCache::new();
        let mut search = RouteSearch::new(session(), route, map, &mut spaces).unwrap();
        for _ in 0..10_000 {
            if search.update_search(map) != SearchStatus::Incomplete {
                break;
            }
        }
        (search.status(), search.calc_path())
    }

    #[test]
    fn single_transition_joins_two_legs() {
        let mut map = layered(2);
        stairs(&mut map, 0, (4, 4), 1, (0, 0));
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(1), c(4, 4)),
        );
        let (status, path) = solve(&map, &route);
        assert_eq!(status, SearchStatus::Complete);
        let path = path.unwrap();
        assert_eq!(path.len(), 18);
        let layers: Vec<LayerId> = path.iter().map(|l| l.layer()).collect();
        assert!(layers[..9].iter().all(|&l| l == LayerId(0)));
        assert!(layers[9..].iter().all(|&l| l == LayerId(1)));
        let nodes: Vec<_> = path.iter().copied().collect();
        assert_eq!(nodes[8], Location::new(LayerId(0), c(4, 4)));
        assert_eq!(nodes[9], Location::new(LayerId(1), c(0, 0)));
    }

    #[test]
    fn neighbour_plan_prefers_the_shorter_walk() {
        let mut map = layered(2);
        stairs(&mut map, 0, (4, 0), 1, (4, 0));
        stairs(&mut map, 0, (0, 4), 1, (0, 4));
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(1), c(0, 4)),
        );
        let mut spaces = SearchSpaceCache::new();
        let plan = MultiLayer::plan(&route, &map, &mut spaces).unwrap();
        assert_eq!(plan.hops().len(), 1);
        assert_eq!(plan.hops()[0].transition.from, c(0, 4));
        assert_eq!(plan.remaining_legs(), 2);
    }

    #[test]
    fn zone_plan_chains_through_an_intermediate_layer() {
        let mut map = layered(3);
        stairs(&mut map, 0, (4, 4), 1, (0, 0));
        stairs(&mut map, 1, (4, 4), 2, (0, 0));
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(2), c(4, 4)),
        );
        let mut spaces = SearchSpaceCache::new();
        let plan = MultiLayer::plan(&route, &map, &mut spaces).unwrap();
        let layers: Vec<LayerId> = plan.hops().iter().map(|h| h.layer).collect();
        assert_eq!(layers, vec![LayerId(0), LayerId(1)]);

        let (status, path) = solve(&map, &route);
        assert_eq!(status, SearchStatus::Complete);
        assert_eq!(path.unwrap().len(), 27);
    }

    #[test]
    fn zone_plan_picks_the_transition_nearest_the_last_waypoint() {
        let mut map = layered(3);
        stairs(&mut map, 0, (4, 4), 1, (4, 4));
        stairs(&mut map, 1, (0, 4), 2, (0, 0));
        stairs(&mut map, 1, (4, 3), 2, (0, 0));
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(2), c(1, 1)),
        );
        let mut spaces = SearchSpaceCache::new();
        let plan = MultiLayer::plan(&route, &map, &mut spaces).unwrap();
        assert_eq!(plan.hops()[1].transition.from, c(4, 3));
    }

    #[test]
    fn no_plan_fails_on_first_step() {
        let mut map = layered(2);
        // The stairs are walled in.
        stairs(&mut map, 0, (4, 4), 1, (0, 0));
        let layer = map.layer_mut(LayerId(0)).unwrap();
        for (x, y) in [(3, 4), (4, 3)] {
            layer.add_instance(Instance::new(format!("w{x}{y}"), Location::new(LayerId(0), c(x, y)), true));
        }
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(1), c(4, 4)),
        );
        let mut spaces = SearchSpaceCache::new();
        let mut search = RouteSearch::new(session(), &route, &map, &mut spaces).unwrap();
        assert_eq!(search.update_search(&map), SearchStatus::Failed);
    }

    #[test]
    fn unknown_layer_is_a_construction_error() {
        let map = layered(1);
        let route = Route::new(
            Location::new(LayerId(0), c(0, 0)),
            Location::new(LayerId(3), c(1, 1)),
        );
        let mut spaces = SearchSpaceCache::new();
        assert_eq!(
            MultiLayer::plan(&route, &map, &mut spaces).err(),
            Some(PathError::UnknownLayer(LayerId(3)))
        );
    }
}
