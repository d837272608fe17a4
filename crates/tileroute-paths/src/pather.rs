//! The route pather: a session manager over incremental searches.
//!
//! Every solved or pending route is a session, addressed by a
//! generation-checked [`SessionId`]. Searches wait in a queue ordered by
//! [`SessionPriority`] (FIFO within a priority) and are advanced by
//! [`RoutePather::update`], at most `max_ticks` steps per call. The front
//! session gets every step until it finishes, then the next one is served.
//!
//! Once a search completes its session holds a [`Path`], which agents walk
//! with [`RoutePather::follow_route`].

use std::mem;

use log::{debug, warn};
use tileroute_core::{LayerId, Location, Map};

use crate::config::PatherConfig;
use crate::error::RouteError;
use crate::priority_queue::PriorityQueue;
use crate::route::{Path, Route, RouteStatus};
use crate::search::{RouteSearch, SearchStatus};
use crate::search_space::SearchSpaceCache;
use crate::session::{SessionArena, SessionId};

/// Queue position of a search. Higher priorities are served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl SessionPriority {
    fn rank(self) -> f64 {
        match self {
            Self::High => 0.0,
            Self::Medium => 1.0,
            Self::Low => 2.0,
        }
    }
}

/// Outcome of one [`RoutePather::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Search steps spent.
    pub ticks: usize,
    /// Sessions whose path became available.
    pub completed: Vec<SessionId>,
    /// Sessions whose search ran out of frontier.
    pub failed: Vec<SessionId>,
}

/// One movement along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowStep {
    /// Where the agent should be after this tick.
    pub next: Location,
    /// A point one step past the current waypoint, for orientation.
    pub facing: Location,
    /// Whether the waypoint was reached and removed from the path.
    pub reached_waypoint: bool,
}

/// Answer of [`RoutePather::get_next_location`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextLocation {
    /// The agent moved along the path of `session`.
    Moved { session: SessionId, step: FollowStep },
    /// The route is still being searched.
    Pending(SessionId),
    /// The path has been walked to its end; the session is closed.
    Arrived,
    /// No route: the request was refused, the search failed or the session
    /// is unknown.
    Failed,
}

#[derive(Debug)]
enum SessionState {
    Search(Box<RouteSearch>),
    Path(Path),
    Failed,
}

#[derive(Debug)]
struct Session {
    route: Route,
    priority: SessionPriority,
    status: RouteStatus,
    state: SessionState,
}

// ---------------------------------------------------------------------------
// RoutePather
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RoutePather {
    config: PatherConfig,
    spaces: SearchSpaceCache,
    sessions: SessionArena<Session>,
    queue: PriorityQueue<SessionId>,
    /// Sessions that failed during the last update, dropped by the next one.
    failed: Vec<SessionId>,
}

impl RoutePather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PatherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PatherConfig {
        &self.config
    }

    /// Build a route request. Both endpoints must lie on layers of `map`;
    /// they may lie on different layers.
    pub fn create_route(
        &self,
        map: &Map,
        start: Location,
        end: Location,
        immediate: bool,
        cost_id: Option<&str>,
    ) -> Result<Route, RouteError> {
        for layer in [start.layer(), end.layer()] {
            if map.layer(layer).is_none() {
                return Err(RouteError::UnknownLayer(layer));
            }
        }
        let route = Route::new(start, end).with_immediate(immediate);
        Ok(match cost_id {
            Some(id) => route.with_cost_id(id),
            None => route,
        })
    }

    /// Open a session for `route`.
    ///
    /// With `immediate` (or an immediate route) the search runs right away,
    /// for at most `max_ticks` steps; if it has not finished by then it
    /// joins the queue like any other session. An immediate search that
    /// fails is reported as [`RouteError::SearchFailed`] and opens no
    /// session.
    pub fn solve_route(
        &mut self,
        map: &Map,
        route: &Route,
        priority: SessionPriority,
        immediate: bool,
    ) -> Result<SessionId, RouteError> {
        let (start, end) = (route.start(), route.end());
        let space = self.spaces.get_or_create(map, end.layer())?;
        let end_cell = space.cell_of(end);
        if start.layer() == end.layer() && space.cell_of(start) == end_cell {
            return Err(RouteError::SameLocation);
        }
        if !space.is_in_search_space(end) {
            return Err(RouteError::OutsideSearchSpace);
        }
        let blocked = map
            .layer(end.layer())
            .is_some_and(|layer| layer.cell_blocks(end_cell, route.ignores_dynamic_blockers()));
        if blocked {
            return Err(RouteError::DestinationBlocked);
        }

        let id = self.sessions.next_id();
        let mut search = RouteSearch::new(id, route, map, &mut self.spaces)?;
        let mut status = RouteStatus::Created;

        if immediate || route.is_immediate() {
            for _ in 0..self.config.max_ticks {
                match search.update_search(map) {
                    SearchStatus::Incomplete => continue,
                    SearchStatus::Complete => {
                        let path = search.calc_path().unwrap_or_default();
                        debug!("{id}: solved {start} -> {end}, {} waypoints", path.len());
                        self.sessions.insert(Session {
                            route: route.clone(),
                            priority,
                            status: RouteStatus::Searched,
                            state: SessionState::Path(path),
                        });
                        return Ok(id);
                    }
                    SearchStatus::Failed => {
                        debug!("no route {start} -> {end}");
                        return Err(RouteError::SearchFailed);
                    }
                }
            }
            warn!(
                "{id}: immediate search {start} -> {end} still open after {} steps, queued",
                self.config.max_ticks
            );
            if search.steps() > 0 {
                status = RouteStatus::Searching;
            }
        }

        let inserted = self.sessions.insert(Session {
            route: route.clone(),
            priority,
            status,
            state: SessionState::Search(Box::new(search)),
        });
        debug_assert_eq!(inserted, id);
        self.queue.push(id, priority.rank());
        debug!("{id}: queued {start} -> {end} at {priority:?}");
        Ok(id)
    }

    /// Advance queued searches by up to `max_ticks` steps in total.
    ///
    /// A search that fails here is not dropped at once: its session keeps
    /// [`RouteStatus::Failed`] and is listed in [`UpdateReport::failed`], so
    /// callers can still query it. It is removed at the start of the next
    /// `update` unless it was cancelled before.
    pub fn update(&mut self, map: &Map) -> UpdateReport {
        for id in mem::take(&mut self.failed) {
            self.sessions.remove(id);
        }

        let mut report = UpdateReport::default();
        while report.ticks < self.config.max_ticks {
            let Some((id, _)) = self.queue.peek_best() else {
                break;
            };
            let Some(session) = self.sessions.get_mut(id) else {
                self.queue.remove(id);
                continue;
            };
            let SessionState::Search(search) = &mut session.state else {
                self.queue.remove(id);
                continue;
            };

            report.ticks += 1;
            session.status = RouteStatus::Searching;
            match search.update_search(map) {
                SearchStatus::Incomplete => {}
                SearchStatus::Complete => {
                    let path = search.calc_path().unwrap_or_default();
                    debug!("{id}: search complete, {} waypoints", path.len());
                    session.state = SessionState::Path(path);
                    session.status = RouteStatus::Searched;
                    self.queue.remove(id);
                    report.completed.push(id);
                }
                SearchStatus::Failed => {
                    debug!("{id}: search failed after {} steps", search.steps());
                    session.state = SessionState::Failed;
                    session.status = RouteStatus::Failed;
                    self.queue.remove(id);
                    self.failed.push(id);
                    report.failed.push(id);
                }
            }
        }
        report
    }

    /// Move an agent at `current` along the path of `session` by up to
    /// `speed` map units.
    ///
    /// Movement never passes the next waypoint: an agent that would
    /// overshoot stops on it and the waypoint is popped. A waypoint on
    /// another layer is reached by teleporting. Returns `None` for unknown
    /// sessions, sessions without a path yet, and walked-out paths.
    pub fn follow_route(
        &mut self,
        map: &Map,
        session: SessionId,
        current: &Location,
        speed: f64,
    ) -> Option<FollowStep> {
        let s = self.sessions.get_mut(session)?;
        let SessionState::Path(path) = &mut s.state else {
            return None;
        };
        let target = *path.front()?;
        let step = follow_towards(map, current, target, speed)?;
        if step.reached_waypoint {
            path.pop_front();
            if path.reached_end() {
                s.status = RouteStatus::Solved;
            }
        }
        Some(step)
    }

    /// Follow-or-request in one call.
    ///
    /// Without a session a search from `current` to `target` is queued.
    /// With one, the agent is moved along its path once the path is known.
    /// Walked-out and failed sessions are closed here.
    pub fn get_next_location(
        &mut self,
        map: &Map,
        current: &Location,
        target: &Location,
        speed: f64,
        session: Option<SessionId>,
        priority: SessionPriority,
    ) -> NextLocation {
        if let Some(id) = session {
            let state = self.sessions.get(id).map(|s| &s.state);
            return match state {
                None => NextLocation::Failed,
                Some(SessionState::Search(_)) => NextLocation::Pending(id),
                Some(SessionState::Failed) => {
                    self.cancel_session(id);
                    NextLocation::Failed
                }
                Some(SessionState::Path(path)) if path.reached_end() => {
                    self.cancel_session(id);
                    NextLocation::Arrived
                }
                Some(SessionState::Path(_)) => match self.follow_route(map, id, current, speed) {
                    Some(step) => NextLocation::Moved { session: id, step },
                    None => NextLocation::Failed,
                },
            };
        }

        if current.layer() != target.layer() {
            return NextLocation::Failed;
        }
        let route = Route::new(*current, *target);
        match self.solve_route(map, &route, priority, false) {
            Ok(id) => NextLocation::Pending(id),
            Err(RouteError::SameLocation) => NextLocation::Arrived,
            Err(err) => {
                debug!("route {current} -> {target} refused: {err}");
                NextLocation::Failed
            }
        }
    }

    /// Drop a session, whether it is still searching or holds a path.
    /// Returns false for ids that are unknown or already cancelled.
    pub fn cancel_session(&mut self, session: SessionId) -> bool {
        self.queue.remove(session);
        let cancelled = self.sessions.remove(session).is_some();
        if cancelled {
            debug!("{session}: cancelled");
        }
        cancelled
    }

    pub fn route_status(&self, session: SessionId) -> Option<RouteStatus> {
        self.sessions.get(session).map(|s| s.status)
    }

    pub fn route(&self, session: SessionId) -> Option<&Route> {
        self.sessions.get(session).map(|s| &s.route)
    }

    pub fn priority(&self, session: SessionId) -> Option<SessionPriority> {
        self.sessions.get(session).map(|s| s.priority)
    }

    /// The path of a session whose search has completed.
    pub fn path(&self, session: SessionId) -> Option<&Path> {
        match &self.sessions.get(session)?.state {
            SessionState::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Remove a completed session and hand out its path.
    pub fn take_path(&mut self, session: SessionId) -> Option<Path> {
        self.path(session)?;
        match self.sessions.remove(session)?.state {
            SessionState::Path(path) => Some(path),
            _ => None,
        }
    }

    #[inline]
    pub fn is_session_valid(&self, session: SessionId) -> bool {
        self.sessions.contains(session)
    }

    /// Live sessions: queued, searching, holding a path or failed and not
    /// yet dropped.
    #[inline]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sessions waiting for search steps.
    #[inline]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn set_max_ticks(&mut self, max_ticks: usize) {
        self.config.max_ticks = max_ticks;
    }

    #[inline]
    pub fn max_ticks(&self) -> usize {
        self.config.max_ticks
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Forget the cached search space of `layer`, e.g. after its bounds or
    /// grid changed. Searches already running keep the old one.
    pub fn invalidate_search_space(&mut self, layer: LayerId) -> bool {
        self.spaces.invalidate(layer)
    }

    pub fn clear_search_spaces(&mut self) {
        self.spaces.clear();
    }

    /// Drop every session. Ids handed out before stay invalid.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.sessions.clear();
        self.failed.clear();
    }
}

/// One movement from `current` towards `target`, in map space.
fn follow_towards(map: &Map, current: &Location, target: Location, speed: f64) -> Option<FollowStep> {
    if current.layer() != target.layer() {
        return Some(FollowStep {
            next: target,
            facing: target,
            reached_waypoint: true,
        });
    }
    let grid = map.layer(current.layer())?.grid();
    let pos = current.map_coordinates(grid);
    let goal = target.map_coordinates(grid);
    let delta = goal - pos;
    let dist = delta.length();

    let mut facing = target;
    facing.set_map_coordinates(grid, goal + delta);

    let speed = speed.max(0.0);
    if speed >= dist {
        return Some(FollowStep {
            next: target,
            facing,
            reached_waypoint: true,
        });
    }
    let mut next = *current;
    next.set_map_coordinates(grid, pos + delta * (speed / dist));
    Some(FollowStep {
        next,
        facing,
        reached_waypoint: false,
    })
}
