use tileroute_core::Map;

use super::{Leg, Traversal};
use crate::error::PathError;
use crate::route::Route;
use crate::search_space::SearchSpaceCache;

/// The whole route as one leg on the destination layer.
#[derive(Debug)]
pub struct SingleLayer {
    leg: Option<Leg>,
}

impl SingleLayer {
    pub fn new(route: &Route, map: &Map, spaces: &mut SearchSpaceCache) -> Result<Self, PathError> {
        let space = spaces.get_or_create(map, route.end().layer())?;
        let leg = Leg::new(*route.start(), *route.end(), space)?;
        Ok(Self { leg: Some(leg) })
    }
}

impl Traversal for SingleLayer {
    fn next_leg(&mut self) -> Option<Leg> {
        self.leg.take()
    }

    fn remaining_legs(&self) -> usize {
        usize::from(self.leg.is_some())
    }
}
