/// ----- REQUEST SET -----
/// Pending floor targets split by the direction of the sweep that will
/// serve them. Both halves are ordered sets, so the nearest floor in the
/// direction of travel is found without scanning unrelated entries.

use std::collections::BTreeSet;

use shared_resources::direction::Direction;
use shared_resources::error::{QueueError, RequestError};
use shared_resources::request::Floor;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSet {
    up: BTreeSet<Floor>,
    down: BTreeSet<Floor>,
}

impl RequestSet {
    pub fn new() -> Self {
        RequestSet::default()
    }

    /// Direction of the sweep that serves a cab request for `floor` while the
    /// car is at `current_floor`.
    pub fn classify(current_floor: Floor, floor: Floor) -> Result<Direction, RequestError> {
        if floor > current_floor {
            Ok(Direction::Up)
        } else if floor < current_floor {
            Ok(Direction::Down)
        } else {
            Err(RequestError::AlreadyAtFloor(floor))
        }
    }

    /// Returns false if the floor was already queued. The caller is
    /// responsible for range checks.
    pub fn add_up(&mut self, floor: Floor) -> bool {
        self.up.insert(floor)
    }

    pub fn add_down(&mut self, floor: Floor) -> bool {
        self.down.insert(floor)
    }

    pub fn add(&mut self, direction: Direction, floor: Floor) -> bool {
        match direction {
            Direction::Up => self.add_up(floor),
            Direction::Down => self.add_down(floor),
            Direction::Idle => false,
        }
    }

    /// Lowest floor waiting for an upward sweep.
    pub fn peek_nearest_up(&self) -> Result<Floor, QueueError> {
        self.up.first().copied().ok_or(QueueError::Empty(Direction::Up))
    }

    /// Highest floor waiting for a downward sweep.
    pub fn peek_nearest_down(&self) -> Result<Floor, QueueError> {
        self.down.last().copied().ok_or(QueueError::Empty(Direction::Down))
    }

    /// Where a sweep in `direction` restarts when nothing is left ahead of
    /// the car: the lowest up floor or the highest down floor.
    pub fn peek_nearest(&self, direction: Direction) -> Result<Floor, QueueError> {
        match direction {
            Direction::Up => self.peek_nearest_up(),
            Direction::Down => self.peek_nearest_down(),
            Direction::Idle => Err(QueueError::Empty(Direction::Idle)),
        }
    }

    /// Nearest queued floor at or ahead of `from` for a sweep in `direction`.
    pub fn nearest_ahead(&self, direction: Direction, from: Floor) -> Option<Floor> {
        match direction {
            Direction::Up => self.up.range(from..).next().copied(),
            Direction::Down => self.down.range(..=from).next_back().copied(),
            Direction::Idle => None,
        }
    }

    pub fn remove_served(&mut self, floor: Floor, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up.remove(&floor),
            Direction::Down => self.down.remove(&floor),
            Direction::Idle => false,
        }
    }

    pub fn contains(&self, direction: Direction, floor: Floor) -> bool {
        match direction {
            Direction::Up => self.up.contains(&floor),
            Direction::Down => self.down.contains(&floor),
            Direction::Idle => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    pub fn has_requests(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => !self.up.is_empty(),
            Direction::Down => !self.down.is_empty(),
            Direction::Idle => false,
        }
    }

    pub fn len(&self) -> usize {
        self.up.len() + self.down.len()
    }

    /// Up floors, ascending.
    pub fn up(&self) -> impl Iterator<Item = Floor> + '_ {
        self.up.iter().copied()
    }

    /// Down floors, descending.
    pub fn down(&self) -> impl Iterator<Item = Floor> + '_ {
        self.down.iter().rev().copied()
    }
}
