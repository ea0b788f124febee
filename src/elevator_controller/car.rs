use crate::config::config::{self, Floor};
use crate::elevator_controller::direction::Direction;
use crate::elevator_controller::state::{Mode, Power};
use crate::error::RequestError;

use log::{debug, info};

/// Physical and operational state of one elevator car.
///
/// The car knows nothing about queues. It only checks whether a single
/// request is legal and moves itself one floor at a time toward its
/// destination. Invariant: `moving` and `door_open` are never both set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    current_floor: Floor,
    destination_floor: Option<Floor>,
    direction: Direction,
    moving: bool,
    door_open: bool,
    power: Power,
    mode: Mode,
    enabled: bool,
}

impl Default for Car {
    fn default() -> Self {
        Self::init()
    }
}

impl Car {
    pub fn init() -> Self {
        Self {
            current_floor: config::MIN_FLOOR,
            destination_floor: None,
            direction: Direction::Idle,
            moving: false,
            door_open: false,
            power: Power::On,
            mode: Mode::Normal,
            enabled: true,
        }
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn destination_floor(&self) -> Option<Floor> {
        self.destination_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_door_open(&self) -> bool {
        self.door_open
    }

    pub fn power(&self) -> Power {
        self.power
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Legality of a request for `floor` in the current power/mode, without
    /// changing anything.
    pub fn check_request(&self, floor: Floor) -> Result<(), RequestError> {
        if !config::is_valid_floor(floor) {
            return Err(RequestError::InvalidFloor { floor });
        }
        if self.power == Power::Off {
            return Err(RequestError::PowerOff);
        }
        if self.mode == Mode::Fire && floor != config::RECALL_FLOOR {
            return Err(RequestError::FireRestricted { floor });
        }
        if !self.enabled {
            return Err(RequestError::Disabled);
        }
        Ok(())
    }

    /// Sends the car straight to `floor`. A request for the floor the car is
    /// standing on opens the door at once.
    pub fn request(&mut self, floor: Floor) -> Result<(), RequestError> {
        self.check_request(floor)?;

        if floor == self.current_floor {
            self.open_door();
            return Ok(());
        }

        self.head_towards(floor);
        Ok(())
    }

    /// One simulation step: moves one floor toward the destination and opens
    /// the door on arrival.
    pub fn advance_one_floor(&mut self) {
        if !self.moving {
            return;
        }
        let Some(destination) = self.destination_floor else {
            self.stop();
            return;
        };

        let next = self.current_floor + Direction::towards(self.current_floor, destination).step();
        self.current_floor = next.clamp(config::MIN_FLOOR, config::MAX_FLOOR);
        debug!("Car passing floor {}", self.current_floor);

        if self.current_floor == destination {
            self.open_door();
        }
    }

    pub fn set_power(&mut self, power: Power) {
        self.power = power;
        if power == Power::Off {
            info!("Power off, recalling car from floor {}", self.current_floor);
            self.recall_to_lobby();
        }
    }

    /// Every mode change leaves the car powered. FIRE additionally recalls
    /// it, after which only the lobby is served.
    pub fn set_mode(&mut self, mode: Mode) {
        let previous = self.mode;
        self.mode = mode;
        if self.power == Power::Off {
            info!("Mode {:?} powers the car back on at floor {}", mode, self.current_floor);
            self.power = Power::On;
        }
        if mode == Mode::Fire {
            info!("Fire mode, recalling car from floor {}", self.current_floor);
            self.recall_to_lobby();
        } else if previous == Mode::Fire {
            info!("Fire mode cleared, car back in {:?} mode at floor {}", mode, self.current_floor);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drives the car to the lobby and returns it to the state it was
    /// created in.
    pub fn reset(&mut self) {
        self.recall_to_lobby();
        *self = Self::init();
    }

    pub(crate) fn open_door(&mut self) {
        self.moving = false;
        self.direction = Direction::Idle;
        self.destination_floor = None;
        self.door_open = true;
    }

    pub(crate) fn close_door(&mut self) {
        self.door_open = false;
    }

    pub(crate) fn stop(&mut self) {
        self.moving = false;
        self.direction = Direction::Idle;
        self.destination_floor = None;
    }

    /// Commits the car to travel toward `floor`. The caller steps it with
    /// `advance_one_floor`.
    pub(crate) fn head_towards(&mut self, floor: Floor) {
        let floor = floor.clamp(config::MIN_FLOOR, config::MAX_FLOOR);
        if floor == self.current_floor {
            self.stop();
            return;
        }
        self.door_open = false;
        self.destination_floor = Some(floor);
        self.direction = Direction::towards(self.current_floor, floor);
        self.moving = true;
    }

    /// Runs the whole trip to the recall floor inside this call, then
    /// parks with the door open.
    fn recall_to_lobby(&mut self) {
        self.door_open = false;
        self.head_towards(config::RECALL_FLOOR);
        while self.moving {
            self.advance_one_floor();
        }
        self.open_door();
    }
}
