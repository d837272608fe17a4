//! Incremental route finding over tile layers.
//!
//! Routes are solved by a best-first (A\*) search that can be advanced one
//! step at a time, so a game loop can spread the work of many agents over
//! several frames:
//!
//! - [`RoutePather`] owns the sessions, runs queued searches within a
//!   per-frame step budget and moves agents along the paths found.
//! - [`Search`] is the resumable state machine, over a [`SingleLayer`] or a
//!   [`MultiLayer`] traversal.
//! - [`SearchSpace`] maps the cells of a layer to dense indices; one is
//!   cached per layer and shared by all searches on it.
//! - [`PriorityQueue`] is the indexed frontier, with re-prioritisation and
//!   FIFO order among equal priorities.
//!
//! # Traits
//!
//! | Trait | Role |
//! |---|---|
//! | [`Pather`] | the route-finding interface, implemented by [`RoutePather`] |
//! | [`Heuristic`] | cost estimate for one cell grid type |
//! | [`Traversal`] | supplies the single-layer legs of a search |
//!
//! Nothing here touches the map: layers, instances and transitions are read
//! through [`tileroute_core`].

mod config;
mod error;
mod heuristic;
mod pather;
mod priority_queue;
mod route;
mod search;
mod search_space;
mod session;
mod traits;
mod zones;

pub use config::{DEFAULT_MAX_TICKS, PatherConfig};
pub use error::{PathError, RouteError};
pub use heuristic::{HexGridHeuristic, Heuristic, SquareGridHeuristic, heuristic_for};
pub use pather::{FollowStep, NextLocation, RoutePather, SessionPriority, UpdateReport};
pub use priority_queue::{PriorityQueue, QueueOrder};
pub use route::{Path, Route, RouteStatus};
pub use search::{
    Hop, Leg, MultiLayer, RouteSearch, Search, SearchStatus, SingleLayer, Traversal,
};
pub use search_space::{SearchSpace, SearchSpaceCache};
pub use session::SessionId;
pub use traits::Pather;
pub use zones::{Zone, ZoneMap, Zones};
