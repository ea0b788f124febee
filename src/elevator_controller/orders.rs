use crate::config::config::Floor;
use crate::elevator_controller::direction::CallDirection;

use std::collections::BTreeSet;

/// Pending stops of one car, split by the direction they are served in.
///
/// A floor is in at most one of the two sets. A second call for a floor
/// that is already scheduled collapses into the existing stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stops {
    up: BTreeSet<Floor>,
    down: BTreeSet<Floor>,
}

impl Stops {
    pub fn init() -> Self {
        Self::default()
    }

    /// Returns false when the floor was already scheduled in either set.
    pub fn insert(&mut self, floor: Floor, direction: CallDirection) -> bool {
        if self.is_scheduled(floor) {
            return false;
        }
        self.set_mut(direction).insert(floor)
    }

    pub fn remove(&mut self, floor: Floor, direction: CallDirection) -> bool {
        self.set_mut(direction).remove(&floor)
    }

    pub fn contains(&self, floor: Floor, direction: CallDirection) -> bool {
        self.set(direction).contains(&floor)
    }

    pub fn is_scheduled(&self, floor: Floor) -> bool {
        self.up.contains(&floor) || self.down.contains(&floor)
    }

    /// Which set a scheduled floor lives in.
    pub fn direction_of(&self, floor: Floor) -> Option<CallDirection> {
        if self.up.contains(&floor) {
            Some(CallDirection::Up)
        } else if self.down.contains(&floor) {
            Some(CallDirection::Down)
        } else {
            None
        }
    }

    /// Lowest up stop at or above `floor`.
    pub fn next_up_from(&self, floor: Floor) -> Option<Floor> {
        self.up.range(floor..).next().copied()
    }

    /// Highest down stop at or below `floor`.
    pub fn next_down_from(&self, floor: Floor) -> Option<Floor> {
        self.down.range(..=floor).next_back().copied()
    }

    pub fn lowest_up(&self) -> Option<Floor> {
        self.up.iter().next().copied()
    }

    pub fn highest_down(&self) -> Option<Floor> {
        self.down.iter().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    pub fn clear(&mut self) {
        self.up.clear();
        self.down.clear();
    }

    /// Up stops in ascending order.
    pub fn up_stops(&self) -> Vec<Floor> {
        self.up.iter().copied().collect()
    }

    /// Down stops in descending order.
    pub fn down_stops(&self) -> Vec<Floor> {
        self.down.iter().rev().copied().collect()
    }

    fn set(&self, direction: CallDirection) -> &BTreeSet<Floor> {
        match direction {
            CallDirection::Up => &self.up,
            CallDirection::Down => &self.down,
        }
    }

    fn set_mut(&mut self, direction: CallDirection) -> &mut BTreeSet<Floor> {
        match direction {
            CallDirection::Up => &mut self.up,
            CallDirection::Down => &mut self.down,
        }
    }
}
