use std::fmt;

/// Travel direction of the car. `Idle` is both the initial state and the
/// state the car returns to once nothing is pending.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    #[default]
    Idle,
    Up,
}

impl Direction {
    pub fn as_string(self) -> String {
        match self {
            Direction::Down => String::from("down"),
            Direction::Idle => String::from("idle"),
            Direction::Up => String::from("up"),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// Signed floor increment for one unit of movement.
    pub fn step(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_travel_directions_only() {
        assert_eq!(Direction::parse(" UP "), Some(Direction::Up));
        assert_eq!(Direction::parse("d"), Some(Direction::Down));
        assert_eq!(Direction::parse("idle"), None);
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn opposite_and_step() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Idle.opposite(), Direction::Idle);
        assert_eq!(Direction::Down.step(), -1);
        assert_eq!(Direction::Up.to_string(), "UP");
    }
}
