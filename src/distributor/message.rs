//! Bus messages and the commands they carry.
//!
//! A message is the integer triplet `(topic, subtopic, body)`. Two encodings
//! are in use on the bus and both decode into the same `Command` set:
//!
//! - flag-body: `topic` names the command class, `subtopic` addresses a car
//!   (0 = every car), `body` is a small flag value for MODE.
//! - opcode: `body = (opcode << 16) | arg`, `topic` addresses a car
//!   (0 = every car), `subtopic` is unused.
//!
//! A non-zero upper half in `body` marks the opcode encoding; flag bodies
//! never reach 0x10000. Anything unrecognised decodes to `None`.

use crate::config::config::{self, CarId, Floor};
use crate::elevator_controller::direction::Direction;
use crate::elevator_controller::state::State;

use serde;

pub const TOPIC_SYSTEM_STOP: i32 = 1;
pub const TOPIC_SYSTEM_START: i32 = 2;
pub const TOPIC_SYSTEM_RESET: i32 = 3;
pub const TOPIC_CLEAR_FIRE: i32 = 4;
pub const TOPIC_MODE: i32 = 5;
pub const TOPIC_START_ONE: i32 = 6;
pub const TOPIC_STOP_ONE: i32 = 7;

pub const BODY_MODE_CENTRALIZED: i32 = 1000;
pub const BODY_MODE_INDEPENDENT: i32 = 1100;
pub const BODY_MODE_TEST_FIRE: i32 = 1110;

pub const OP_START: u32 = 1;
pub const OP_STOP: u32 = 2;
pub const OP_RESET: u32 = 3;
pub const OP_FIRE_ON: u32 = 4;
pub const OP_FIRE_CLEAR: u32 = 5;
pub const OP_GOTO: u32 = 6;
pub const OP_OPEN: u32 = 7;
pub const OP_CLOSE: u32 = 8;
pub const OP_ENABLE: u32 = 9;
pub const OP_DISABLE: u32 = 10;
pub const OP_STATUS: u32 = 11;
pub const OP_ELEV_START: u32 = 12;
pub const OP_ELEV_STOP: u32 = 13;

const BROADCAST: i32 = 0;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub topic: i32,
    pub subtopic: i32,
    pub body: i32,
}

impl Message {
    pub fn new(topic: i32, subtopic: i32, body: i32) -> Self {
        Self { topic, subtopic, body }
    }

    pub fn opcode(&self) -> u32 {
        ((self.body as u32) >> 16) & 0xFFFF
    }

    pub fn arg(&self) -> u32 {
        (self.body as u32) & 0xFFFF
    }

    /// Compact `TSBBBB` rendering for logs.
    pub fn tsbbbb(&self) -> String {
        format!("{}{}{:04}", self.topic, self.subtopic, self.body)
    }

    /// Parses a `topic subtopic body` line. Blank lines and `#` comments
    /// give `None`, as does anything that is not three integers.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<i32> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|field| !field.is_empty())
            .map(|field| field.parse::<i32>())
            .collect::<Result<_, _>>()
            .ok()?;
        match fields.as_slice() {
            [topic, subtopic, body] => Some(Self::new(*topic, *subtopic, *body)),
            _ => None,
        }
    }

    /// Opcode-encoded STATUS report for one car.
    pub fn status(state: &State) -> Self {
        let arg = status_arg(state.floor, state.door_open, state.moving, state.direction);
        Self::new(state.car_id as i32, 0, encode(OP_STATUS, arg))
    }
}

pub fn encode(opcode: u32, arg: u32) -> i32 {
    ((opcode << 16) | (arg & 0xFFFF)) as i32
}

/// STATUS argument: floor in bits 0..7, door in bit 8, moving in bit 9,
/// direction code in bits 10..11.
pub fn status_arg(floor: Floor, door_open: bool, moving: bool, direction: Direction) -> u32 {
    let mut arg = (floor as u32) & 0xFF;
    if door_open {
        arg |= 1 << 8;
    }
    if moving {
        arg |= 1 << 9;
    }
    arg | ((direction.to_code() & 0x3) << 10)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedStatus {
    pub floor: Floor,
    pub door_open: bool,
    pub moving: bool,
    pub direction: Direction,
}

pub fn unpack_status(arg: u32) -> Option<PackedStatus> {
    Some(PackedStatus {
        floor: (arg & 0xFF) as Floor,
        door_open: (arg >> 8) & 1 == 1,
        moving: (arg >> 9) & 1 == 1,
        direction: Direction::from_code((arg >> 10) & 0x3)?,
    })
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMode {
    Centralized,
    Independent,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Reset,
    FireOn,
    FireClear,
    Goto(Floor),
    Open,
    Close,
    Enable,
    Disable,
    Status,
    SystemMode(SystemMode),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Car(CarId),
}

impl Target {
    fn from_address(address: i32) -> Option<Self> {
        match address {
            BROADCAST => Some(Target::All),
            id if (1..=config::NUM_CARS as i32).contains(&id) => Some(Target::Car(id as CarId)),
            _ => None,
        }
    }

    pub fn includes(&self, car_id: CarId) -> bool {
        match self {
            Target::All => true,
            Target::Car(id) => *id == car_id,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub target: Target,
    pub command: Command,
}

pub fn decode(message: &Message) -> Option<Envelope> {
    if message.opcode() != 0 {
        decode_opcode(message)
    } else {
        decode_flag_body(message)
    }
}

fn decode_flag_body(message: &Message) -> Option<Envelope> {
    let target = Target::from_address(message.subtopic)?;
    let command = match message.topic {
        TOPIC_SYSTEM_STOP | TOPIC_STOP_ONE => Command::Stop,
        TOPIC_SYSTEM_START | TOPIC_START_ONE => Command::Start,
        TOPIC_SYSTEM_RESET => Command::Reset,
        TOPIC_CLEAR_FIRE => Command::FireClear,
        TOPIC_MODE => match message.body {
            BODY_MODE_CENTRALIZED => Command::SystemMode(SystemMode::Centralized),
            BODY_MODE_INDEPENDENT => Command::SystemMode(SystemMode::Independent),
            BODY_MODE_TEST_FIRE => Command::FireOn,
            _ => return None,
        },
        _ => return None,
    };
    Some(Envelope { target, command })
}

fn decode_opcode(message: &Message) -> Option<Envelope> {
    let target = Target::from_address(message.topic)?;
    let command = match message.opcode() {
        OP_START | OP_ELEV_START => Command::Start,
        OP_STOP | OP_ELEV_STOP => Command::Stop,
        OP_RESET => Command::Reset,
        OP_FIRE_ON => Command::FireOn,
        OP_FIRE_CLEAR => Command::FireClear,
        OP_GOTO => Command::Goto(message.arg() as Floor),
        OP_OPEN => Command::Open,
        OP_CLOSE => Command::Close,
        OP_ENABLE => Command::Enable,
        OP_DISABLE => Command::Disable,
        // A STATUS with a payload is some car's report, not a request.
        OP_STATUS if message.arg() == 0 => Command::Status,
        _ => return None,
    };
    Some(Envelope { target, command })
}
