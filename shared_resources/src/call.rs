use crate::direction::Direction;

/// Where a request was made: a hall call button on a floor, or the
/// destination panel inside the car.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    HallUp = 0,
    HallDown = 1,
    Cab = 2,
}

impl Call {
    /// Hall call matching the travel direction the caller asked for.
    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Up => Some(Call::HallUp),
            Direction::Down => Some(Call::HallDown),
            Direction::Idle => None,
        }
    }

    /// Explicit direction of a hall call. Cab calls have none; their
    /// direction depends on where the car is.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Call::HallUp => Some(Direction::Up),
            Call::HallDown => Some(Direction::Down),
            Call::Cab => None,
        }
    }
}
