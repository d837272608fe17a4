use tileroute_core::{Location, Map};

use crate::error::RouteError;
use crate::pather::{FollowStep, RoutePather, SessionPriority, UpdateReport};
use crate::route::Route;
use crate::session::SessionId;

/// The interface agents and controllers use to get around.
///
/// [`RoutePather`] is the implementation shipped with this crate.
pub trait Pather {
    /// Build a route request between two locations of `map`.
    fn create_route(
        &self,
        map: &Map,
        start: Location,
        end: Location,
        immediate: bool,
        cost_id: Option<&str>,
    ) -> Result<Route, RouteError>;

    /// Open a search session for `route`.
    fn solve_route(
        &mut self,
        map: &Map,
        route: &Route,
        priority: SessionPriority,
        immediate: bool,
    ) -> Result<SessionId, RouteError>;

    /// Move `current` along the solved path of `session` by up to `speed`.
    fn follow_route(
        &mut self,
        map: &Map,
        session: SessionId,
        current: &Location,
        speed: f64,
    ) -> Option<FollowStep>;

    /// Spend one tick of search work. Call once per frame.
    fn update(&mut self, map: &Map) -> UpdateReport;

    /// Drop a session. False if the id is unknown.
    fn cancel_session(&mut self, session: SessionId) -> bool;

    fn set_max_ticks(&mut self, max_ticks: usize);

    fn max_ticks(&self) -> usize;

    fn name(&self) -> &str;
}

impl Pather for RoutePather {
    fn create_route(
        &self,
        map: &Map,
        start: Location,
        end: Location,
        immediate: bool,
        cost_id: Option<&str>,
    ) -> Result<Route, RouteError> {
        RoutePather::create_route(self, map, start, end, immediate, cost_id)
    }

    fn solve_route(
        &mut self,
        map: &Map,
        route: &Route,
        priority: SessionPriority,
        immediate: bool,
    ) -> Result<SessionId, RouteError> {
        RoutePather::solve_route(self, map, route, priority, immediate)
    }

    fn follow_route(
        &mut self,
        map: &Map,
        session: SessionId,
        current: &Location,
        speed: f64,
    ) -> Option<FollowStep> {
        RoutePather::follow_route(self, map, session, current, speed)
    }

    fn update(&mut self, map: &Map) -> UpdateReport {
        RoutePather::update(self, map)
    }

    fn cancel_session(&mut self, session: SessionId) -> bool {
        RoutePather::cancel_session(self, session)
    }

    fn set_max_ticks(&mut self, max_ticks: usize) {
        RoutePather::set_max_ticks(self, max_ticks);
    }

    fn max_ticks(&self) -> usize {
        RoutePather::max_ticks(self)
    }

    fn name(&self) -> &str {
        RoutePather::name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::{c, square_map};
    use tileroute_core::LayerId;

    /// Walk an agent to `to` through any pather.
    fn walk(pather: &mut dyn Pather, map: &Map, from: Location, to: Location) -> Location {
        let route = pather.create_route(map, from, to, false, None).unwrap();
        let id = pather.solve_route(map, &route, SessionPriority::Medium, false).unwrap();
        while !pather.update(map).completed.contains(&id) {}
        let mut pos = from;
        while let Some(step) = pather.follow_route(map, id, &pos, 0.5) {
            pos = step.next;
        }
        assert!(pather.cancel_session(id));
        pos
    }

    #[test]
    fn route_pather_behind_the_trait() {
        let map = square_map(6, 6, &[(2, 0), (2, 1), (2, 2)]);
        let mut pather = RoutePather::new();
        let pather: &mut dyn Pather = &mut pather;
        pather.set_max_ticks(4);
        assert_eq!(pather.max_ticks(), 4);
        assert_eq!(pather.name(), "RoutePather");
        let goal = Location::new(LayerId(0), c(4, 0));
        assert_eq!(walk(pather, &map, Location::new(LayerId(0), c(0, 0)), goal), goal);
    }
}
