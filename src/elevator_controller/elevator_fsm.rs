use crate::config::config::{CarId, Floor};
use crate::elevator_controller::car::Car;
use crate::elevator_controller::direction::{CallDirection, Direction};
use crate::elevator_controller::doors::DoorTimer;
use crate::elevator_controller::orders::Stops;
use crate::elevator_controller::recall;
use crate::elevator_controller::state::{Behaviour, Mode, Power, State};
use crate::error::RequestError;

use log::{debug, info, trace};

/// Per-car scheduler. Owns its car and the car's pending stops, and moves
/// the car one floor per `tick()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatcher {
    car: Car,
    stops: Stops,
    door: DoorTimer,
    scan: Direction,
    direct: Option<Floor>,
}

impl Dispatcher {
    pub fn init() -> Self {
        Self::new(Car::init())
    }

    pub fn new(car: Car) -> Self {
        Self {
            car,
            stops: Stops::init(),
            door: DoorTimer::init(),
            scan: Direction::Idle,
            direct: None,
        }
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub(crate) fn car_mut(&mut self) -> &mut Car {
        &mut self.car
    }

    pub fn stops(&self) -> &Stops {
        &self.stops
    }

    pub fn door_dwell_remaining(&self) -> u32 {
        self.door.remaining()
    }

    /// Direction the dispatcher is currently sweeping in. Unlike the car's
    /// own direction this survives a stop.
    pub fn scan_direction(&self) -> Direction {
        self.scan
    }

    pub fn behaviour(&self) -> Behaviour {
        if self.car.mode() == Mode::Fire || self.car.power() == Power::Off {
            return Behaviour::Override;
        }
        if self.car.is_door_open() && self.door.is_dwelling() {
            return Behaviour::DoorOpenDwelling;
        }
        let heading = match self.scan {
            Direction::Idle => self.car.direction(),
            scan => scan,
        };
        match heading {
            Direction::Up => Behaviour::ScanningUp,
            Direction::Down => Behaviour::ScanningDown,
            Direction::Idle => Behaviour::Idle,
        }
    }

    pub fn state(&self, car_id: CarId) -> State {
        State {
            car_id,
            floor: self.car.current_floor(),
            destination: self.car.destination_floor(),
            direction: self.car.direction(),
            moving: self.car.is_moving(),
            door_open: self.car.is_door_open(),
            power: self.car.power(),
            mode: self.car.mode(),
            enabled: self.car.is_enabled(),
            behaviour: self.behaviour(),
            up_stops: self.stops.up_stops(),
            down_stops: self.stops.down_stops(),
        }
    }

    pub fn add_hall_request(&mut self, floor: Floor, direction: CallDirection) -> Result<(), RequestError> {
        self.car.check_request(floor)?;

        // Queues are not processed under fire recall; the lobby call is
        // answered by the already parked car.
        if self.car.mode() == Mode::Fire {
            self.car.open_door();
            return Ok(());
        }

        if self.stops.insert(floor, direction) {
            debug!("Hall call {:?} at floor {} queued", direction, floor);
        }
        Ok(())
    }

    pub fn add_car_request(&mut self, floor: Floor) -> Result<(), RequestError> {
        self.car.check_request(floor)?;

        let here = self.car.current_floor();
        match CallDirection::from_direction(Direction::towards(here, floor)) {
            Some(direction) => {
                if self.stops.insert(floor, direction) {
                    debug!("Car call to floor {} queued as {:?} stop", floor, direction);
                }
            }
            None => self.car.open_door(),
        }
        Ok(())
    }

    /// Sends the car straight to `floor`, bypassing the queues. It is
    /// stepped by `tick()` whenever no queued stop needs the car, and the
    /// trip resumes after any queued stops taken on the way.
    ///
    /// A goto issued while the door dwells closes the door and ends the
    /// dwell.
    pub fn goto(&mut self, floor: Floor) -> Result<(), RequestError> {
        self.car.request(floor)?;
        if self.car.is_moving() {
            self.direct = Some(floor);
            self.door.cancel();
        } else {
            self.direct = None;
        }
        Ok(())
    }

    /// Destination of a pending `goto`, if any.
    pub fn direct_destination(&self) -> Option<Floor> {
        self.direct
    }

    pub fn set_power(&mut self, power: Power) {
        recall::apply_power(self, power);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        recall::apply_mode(self, mode);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.car.set_enabled(enabled);
    }

    pub fn reset(&mut self) {
        recall::reset(self);
    }

    /// Opens the door of a parked car and restarts the dwell. Refused while
    /// the car is moving.
    pub fn open_door(&mut self) -> bool {
        if self.car.is_moving() {
            return false;
        }
        self.car.open_door();
        self.door.start();
        true
    }

    /// Closes an open door early. Refused while an override holds the door
    /// open.
    pub fn close_door(&mut self) -> bool {
        if !self.car.is_door_open() || self.behaviour() == Behaviour::Override {
            return false;
        }
        self.car.close_door();
        self.door.cancel();
        true
    }

    /// Drops every pending stop, any direct trip and any dwell in progress.
    pub fn clear_requests(&mut self) {
        self.stops.clear();
        self.direct = None;
        self.door.cancel();
        self.scan = Direction::Idle;
    }

    /// One discrete simulation step. Never blocks and never fails; having
    /// nothing to do is a valid resting state.
    pub fn tick(&mut self) {
        if self.car.mode() == Mode::Fire {
            return;
        }

        if self.car.is_door_open() {
            if self.door.is_dwelling() {
                self.door.count_down();
                return;
            }
            if self.stops.is_empty() && self.direct.is_none() {
                self.scan = Direction::Idle;
                return;
            }
            self.car.close_door();
        }

        if self.service_here() {
            return;
        }

        match self.next_stop() {
            Some((floor, queue)) => self.step_towards(floor, queue),
            None => self.drive_direct(),
        }
        trace!("After tick: {:?}", self);
    }

    /// Services the current floor if it is pending in the queue of the scan
    /// direction, or in either queue when not scanning.
    fn service_here(&mut self) -> bool {
        let here = self.car.current_floor();
        let queue = match self.scan {
            Direction::Up => self.stops.contains(here, CallDirection::Up).then_some(CallDirection::Up),
            Direction::Down => self.stops.contains(here, CallDirection::Down).then_some(CallDirection::Down),
            Direction::Idle => self.stops.direction_of(here),
        };
        match queue {
            Some(queue) => {
                self.service(here, queue);
                true
            }
            None => false,
        }
    }

    fn service(&mut self, floor: Floor, queue: CallDirection) {
        self.stops.remove(floor, queue);
        if self.direct == Some(floor) {
            self.direct = None;
        }
        self.car.open_door();
        self.door.start();
        self.scan = if self.stops.is_empty() {
            Direction::Idle
        } else {
            queue.to_direction()
        };
        info!("Serviced {:?} stop at floor {}", queue, floor);
    }

    /// Picks the next stop and the queue it belongs to.
    ///
    /// The car keeps its sweep while a stop is ahead in the sweep direction
    /// and only turns around once that side is exhausted. Stops that sit
    /// behind the car in their own queue are reached by travelling to the
    /// far end of that queue first, so nothing is left stranded.
    fn next_stop(&self) -> Option<(Floor, CallDirection)> {
        use CallDirection::{Down, Up};

        let here = self.car.current_floor();
        let stops = &self.stops;
        let up = |floor: Floor| (floor, Up);
        let down = |floor: Floor| (floor, Down);

        match self.scan {
            Direction::Up => stops
                .next_up_from(here)
                .map(up)
                .or_else(|| stops.highest_down().filter(|&floor| floor > here).map(down))
                .or_else(|| stops.next_down_from(here).map(down))
                .or_else(|| stops.lowest_up().map(up)),
            Direction::Down => stops
                .next_down_from(here)
                .map(down)
                .or_else(|| stops.lowest_up().filter(|&floor| floor < here).map(up))
                .or_else(|| stops.next_up_from(here).map(up))
                .or_else(|| stops.highest_down().map(down)),
            Direction::Idle => nearest(here, stops.next_up_from(here).map(up), stops.next_down_from(here).map(down))
                .or_else(|| {
                    nearest(
                        here,
                        stops.highest_down().filter(|&floor| floor > here).map(down),
                        stops.lowest_up().filter(|&floor| floor < here).map(up),
                    )
                }),
        }
    }

    fn step_towards(&mut self, floor: Floor, queue: CallDirection) {
        let here = self.car.current_floor();
        if floor == here {
            self.service(floor, queue);
            return;
        }

        self.scan = Direction::towards(here, floor);
        self.car.head_towards(floor);
        self.car.advance_one_floor();

        if self.car.current_floor() == floor {
            self.service(floor, queue);
        } else {
            self.service_here();
        }
    }

    /// Steps a car that was sent somewhere with `goto`, heading it back
    /// toward the destination if queued stops took it elsewhere.
    fn drive_direct(&mut self) {
        self.scan = Direction::Idle;
        let Some(target) = self.direct else {
            return;
        };
        if !self.car.is_moving() {
            if self.car.current_floor() == target {
                self.direct = None;
                return;
            }
            debug!("Resuming direct trip to floor {}", target);
            self.car.head_towards(target);
        }
        self.car.advance_one_floor();
        if self.car.is_door_open() {
            self.direct = None;
            self.door.start();
            info!("Arrived at floor {}", self.car.current_floor());
        }
    }
}

/// The closer of two candidate stops, preferring the one above the car on a
/// tie.
fn nearest(
    here: Floor,
    above: Option<(Floor, CallDirection)>,
    below: Option<(Floor, CallDirection)>,
) -> Option<(Floor, CallDirection)> {
    match (above, below) {
        (Some(a), Some(b)) => {
            if (a.0 - here).abs() <= (here - b.0).abs() {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, b) => a.or(b),
    }
}
