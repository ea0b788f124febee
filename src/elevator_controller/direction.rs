use serde;

/// Travel direction of a car. `Idle` means the car is not committed to
/// either way.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Direction {
    Up,
    Down,
    #[default]
    Idle,
}

impl Direction {
    /// Direction of travel from one floor to another.
    pub fn towards(from: i32, to: i32) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    /// Floor delta of one step in this direction.
    pub fn step(&self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }

    /// Two-bit code used when a status is packed into a bus message body.
    pub fn to_code(&self) -> u32 {
        match self {
            Direction::Idle => 0,
            Direction::Up => 1,
            Direction::Down => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Direction::Idle),
            1 => Some(Direction::Up),
            2 => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn to_string(&self) -> String {
        match self {
            Direction::Up => "up".to_string(),
            Direction::Down => "down".to_string(),
            Direction::Idle => "idle".to_string(),
        }
    }
}

/// The direction a hall call asks to travel in.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CallDirection {
    Up,
    Down,
}

impl CallDirection {
    pub fn to_direction(&self) -> Direction {
        match self {
            CallDirection::Up => Direction::Up,
            CallDirection::Down => Direction::Down,
        }
    }

    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Up => Some(CallDirection::Up),
            Direction::Down => Some(CallDirection::Down),
            Direction::Idle => None,
        }
    }
}
