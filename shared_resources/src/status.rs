use std::fmt;

use crate::direction::Direction;
use crate::request::Floor;

/// State change notification emitted by the controller while it runs.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StatusEvent {
    SweepStarted { direction: Direction },
    FloorChanged { floor: Floor, direction: Direction },
    DoorOpened { floor: Floor },
    DoorClosed { floor: Floor },
    Idle { floor: Floor },
}

impl StatusEvent {
    pub fn floor(&self) -> Option<Floor> {
        match *self {
            StatusEvent::SweepStarted { .. } => None,
            StatusEvent::FloorChanged { floor, .. }
            | StatusEvent::DoorOpened { floor }
            | StatusEvent::DoorClosed { floor }
            | StatusEvent::Idle { floor } => Some(floor),
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::SweepStarted { direction } => write!(f, "Moving {}...", direction),
            StatusEvent::FloorChanged { floor, direction } => {
                write!(f, "Current floor: {} | Direction: {}", floor, direction)
            }
            StatusEvent::DoorOpened { floor } => {
                write!(f, "Stopping at floor {}. Doors opening...", floor)
            }
            StatusEvent::DoorClosed { .. } => write!(f, "Doors closing..."),
            StatusEvent::Idle { floor } => {
                write!(f, "All requests completed. Elevator is now IDLE at floor {}.", floor)
            }
        }
    }
}
