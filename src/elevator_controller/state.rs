use crate::config::config::{CarId, Floor};
use crate::elevator_controller::direction::Direction;

use serde;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Power {
    #[default]
    On,
    Off,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Fire,
    Auto,
}

/// What the dispatcher is doing between two ticks.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Behaviour {
    Idle,
    ScanningUp,
    ScanningDown,
    DoorOpenDwelling,
    Override,
}

impl Behaviour {
    pub fn to_string(&self) -> String {
        match self {
            Behaviour::Idle => "idle".to_string(),
            Behaviour::ScanningUp => "scanningUp".to_string(),
            Behaviour::ScanningDown => "scanningDown".to_string(),
            Behaviour::DoorOpenDwelling => "doorOpen".to_string(),
            Behaviour::Override => "override".to_string(),
        }
    }
}

/// Snapshot of one car as seen by the presentation layer after a tick.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct State {
    pub car_id: CarId,
    pub floor: Floor,
    pub destination: Option<Floor>,
    pub direction: Direction,
    pub moving: bool,
    pub door_open: bool,
    pub power: Power,
    pub mode: Mode,
    pub enabled: bool,
    pub behaviour: Behaviour,
    pub up_stops: Vec<Floor>,
    pub down_stops: Vec<Floor>,
}

impl State {
    pub fn is_available(&self) -> bool {
        self.enabled && self.power == Power::On && self.mode != Mode::Fire
    }
}
