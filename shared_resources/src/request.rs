use crate::call::Call;
use crate::direction::Direction;

/// Floor number. Signed so basements and bad input can be represented and
/// rejected instead of wrapping.
pub type Floor = i32;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub floor: Floor,
    pub call: Call,
}

impl Request {
    /// Destination chosen from inside the car.
    pub fn cab(floor: Floor) -> Self {
        Request { floor, call: Call::Cab }
    }

    /// Hall call. `Direction::Idle` is not a valid hall call.
    pub fn hall(floor: Floor, direction: Direction) -> Option<Self> {
        Call::from_direction(direction).map(|call| Request { floor, call })
    }
}
