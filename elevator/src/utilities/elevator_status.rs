use shared_resources::direction::Direction;
use shared_resources::request::Floor;

use crate::utilities::request_set::RequestSet;

#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum Behaviour {
    #[default]
    Idle,
    Moving,
    DoorOpen,
}

impl Behaviour {
    pub fn as_string(&self) -> String {
        match self {
            Behaviour::Idle => String::from("idle"),
            Behaviour::Moving => String::from("moving"),
            Behaviour::DoorOpen => String::from("doorOpen"),
        }
    }
}

/// Snapshot of the car taken under the controller lock.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub requests: RequestSet,
    pub behaviour: Behaviour,
    pub floor: Floor,
    pub direction: Direction,
}

impl ElevatorStatus {
    pub fn new(floor: Floor) -> Self {
        ElevatorStatus {
            requests: RequestSet::new(),
            behaviour: Behaviour::Idle,
            floor,
            direction: Direction::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.behaviour == Behaviour::Idle && self.direction == Direction::Idle
    }
}
