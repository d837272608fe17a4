//! Errors reported by route searches and the route pather.

use thiserror::Error;
use tileroute_core::LayerId;

/// Errors raised while setting up a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No heuristic is registered for this cell grid type.
    #[error("no heuristic for cell grid type \u{201c}{0}\u{201d}")]
    UnknownHeuristic(String),
    /// A location refers to a layer the map does not have.
    #[error("{0} is not part of the map")]
    UnknownLayer(LayerId),
}

/// Reasons a route request is refused. Callers are expected to check these
/// and retry with another destination; none of them is a programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("start and destination are the same cell")]
    SameLocation,
    #[error("destination cell is blocked")]
    DestinationBlocked,
    #[error("location is outside the search space of its layer")]
    OutsideSearchSpace,
    #[error("{0} is not part of the map")]
    UnknownLayer(LayerId),
    #[error("no heuristic for cell grid type \u{201c}{0}\u{201d}")]
    NoHeuristic(String),
    /// An immediate solve exhausted its frontier.
    #[error("no route between the two locations")]
    SearchFailed,
}

impl From<PathError> for RouteError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::UnknownHeuristic(grid_type) => RouteError::NoHeuristic(grid_type),
            PathError::UnknownLayer(layer) => RouteError::UnknownLayer(layer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_errors_map_onto_route_errors() {
        let err: RouteError = PathError::UnknownHeuristic("triangle".into()).into();
        assert_eq!(err, RouteError::NoHeuristic("triangle".into()));
        let err: RouteError = PathError::UnknownLayer(LayerId(3)).into();
        assert_eq!(err.to_string(), "layer#3 is not part of the map");
    }
}
