//! Behavioural scenarios run by the `harness` binary.
//!
//! Each scenario drives the public API only and reports the first broken
//! expectation as an error string.

use crate::config::config::{self, Floor};
use crate::distributor::distributor::Bank;
use crate::distributor::message::{encode, unpack_status, Message, OP_GOTO, OP_STATUS};
use crate::elevator_controller::car::Car;
use crate::elevator_controller::direction::{CallDirection, Direction};
use crate::elevator_controller::elevator_fsm::Dispatcher;
use crate::elevator_controller::state::{Mode, Power};
use crate::error::RequestError;

pub type Outcome = Result<(), String>;

const MAX_TICKS: usize = 500;

macro_rules! ensure {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err(format!($($fmt)+));
        }
    };
}

pub fn run_all() -> Vec<(&'static str, Outcome)> {
    let scenarios: [(&'static str, fn() -> Outcome); 13] = [
        ("initial state", initial_state),
        ("request same floor opens door", request_same_floor_opens_door),
        ("request reaches every floor", request_reaches_every_floor),
        ("invalid floors are refused", invalid_floors_are_refused),
        ("fire recall from every floor", fire_recall_from_every_floor),
        ("power-off recall from every floor", power_off_recall_from_every_floor),
        ("up calls serviced in one sweep", up_calls_serviced_in_one_sweep),
        ("mixed calls drain without early reversal", mixed_calls_drain_without_early_reversal),
        ("moving car never has an open door", moving_car_never_has_open_door),
        ("idle tick changes nothing", idle_tick_changes_nothing),
        ("reset clears overrides", reset_clears_overrides),
        ("flag-body bus commands", flag_body_bus_commands),
        ("opcode bus commands", opcode_bus_commands),
    ];
    scenarios.iter().map(|(name, scenario)| (*name, scenario())).collect()
}

/// Ticks until the queues are drained and the door has stopped dwelling.
/// Fails if `moving` and `door_open` are ever seen together or if a
/// direction change happens while a stop is still pending ahead.
fn run_to_completion(dispatcher: &mut Dispatcher) -> Result<Vec<Floor>, String> {
    let mut visited = vec![dispatcher.car().current_floor()];
    let mut heading = Direction::Idle;

    for _ in 0..MAX_TICKS {
        check_motion_invariant(dispatcher.car())?;
        if dispatcher.stops().is_empty()
            && dispatcher.direct_destination().is_none()
            && dispatcher.door_dwell_remaining() == 0
            && !dispatcher.car().is_moving()
        {
            return Ok(visited);
        }

        let here = dispatcher.car().current_floor();
        let pending = [dispatcher.stops().up_stops(), dispatcher.stops().down_stops()].concat();
        dispatcher.tick();
        let now = dispatcher.car().current_floor();

        let moved = Direction::towards(here, now);
        if moved != Direction::Idle {
            let ahead = |floor: &Floor| Direction::towards(here, *floor) == heading;
            ensure!(
                moved == heading || heading == Direction::Idle || !pending.iter().any(ahead),
                "car turned {:?} at floor {} with stops {:?} still ahead",
                moved,
                here,
                pending
            );
            heading = moved;
            visited.push(now);
        }
    }
    Err(format!("queues not drained after {} ticks", MAX_TICKS))
}

fn check_motion_invariant(car: &Car) -> Outcome {
    ensure!(
        !(car.is_moving() && car.is_door_open()),
        "car at floor {} is moving with its door open",
        car.current_floor()
    );
    Ok(())
}

fn car_at(floor: Floor) -> Result<Car, String> {
    let mut car = Car::init();
    car.request(floor).map_err(|e| e.to_string())?;
    while car.is_moving() {
        car.advance_one_floor();
        check_motion_invariant(&car)?;
    }
    ensure!(car.current_floor() == floor, "car stopped at {} instead of {}", car.current_floor(), floor);
    Ok(car)
}

fn initial_state() -> Outcome {
    let car = Car::init();
    ensure!(car.current_floor() == config::MIN_FLOOR, "starts at floor {}", car.current_floor());
    ensure!(car.destination_floor().is_none(), "starts with destination {:?}", car.destination_floor());
    ensure!(car.direction() == Direction::Idle, "starts heading {:?}", car.direction());
    ensure!(!car.is_moving() && !car.is_door_open(), "starts moving or with the door open");
    ensure!(car.power() == Power::On, "starts powered {:?}", car.power());
    ensure!(car.mode() == Mode::Normal, "starts in mode {:?}", car.mode());
    ensure!(car.is_enabled(), "starts disabled");

    let dispatcher = Dispatcher::init();
    ensure!(dispatcher.stops().is_empty(), "starts with stops {:?}", dispatcher.state(1));
    Ok(())
}

fn request_same_floor_opens_door() -> Outcome {
    let mut car = Car::init();
    car.request(config::MIN_FLOOR).map_err(|e| e.to_string())?;
    ensure!(car.is_door_open(), "door stayed closed");
    ensure!(!car.is_moving(), "car started moving");
    ensure!(car.direction() == Direction::Idle, "car heads {:?}", car.direction());
    ensure!(car.current_floor() == config::MIN_FLOOR, "car left for floor {}", car.current_floor());
    Ok(())
}

fn request_reaches_every_floor() -> Outcome {
    for floor in config::MIN_FLOOR..=config::MAX_FLOOR {
        let car = car_at(floor)?;
        ensure!(car.is_door_open(), "door closed after arriving at floor {}", floor);
    }
    Ok(())
}

fn invalid_floors_are_refused() -> Outcome {
    let mut car = Car::init();
    for floor in [0, 11, -1] {
        let result = car.request(floor);
        ensure!(
            result == Err(RequestError::InvalidFloor { floor }),
            "request({}) gave {:?}",
            floor,
            result
        );
    }
    Ok(())
}

fn check_recalled(car: &Car, from: Floor) -> Outcome {
    ensure!(
        car.current_floor() == config::RECALL_FLOOR && car.is_door_open() && !car.is_moving(),
        "recall from floor {} left the car at {} (door open: {})",
        from,
        car.current_floor(),
        car.is_door_open()
    );
    Ok(())
}

fn fire_recall_from_every_floor() -> Outcome {
    for floor in 2..=config::MAX_FLOOR {
        let mut car = car_at(floor)?;
        car.set_mode(Mode::Fire);
        check_recalled(&car, floor)?;
        ensure!(car.mode() == Mode::Fire, "mode is {:?} after fire recall", car.mode());
        let result = car.request(3);
        ensure!(result == Err(RequestError::FireRestricted { floor: 3 }), "request(3) in fire mode gave {:?}", result);
    }
    Ok(())
}

fn power_off_recall_from_every_floor() -> Outcome {
    for floor in 2..=config::MAX_FLOOR {
        let mut car = car_at(floor)?;
        car.set_power(Power::Off);
        check_recalled(&car, floor)?;
        let result = car.request(3);
        ensure!(result == Err(RequestError::PowerOff), "request(3) while powered off gave {:?}", result);
    }
    Ok(())
}

fn up_calls_serviced_in_one_sweep() -> Outcome {
    let mut dispatcher = Dispatcher::init();
    for floor in [4, 7, 10] {
        dispatcher.add_hall_request(floor, CallDirection::Up).map_err(|e| e.to_string())?;
    }
    let visited = run_to_completion(&mut dispatcher)?;

    ensure!(visited.windows(2).all(|pair| pair[0] < pair[1]), "car reversed on the way up: {:?}", visited);
    let car = dispatcher.car();
    ensure!(car.current_floor() == 10, "ended at floor {}", car.current_floor());
    ensure!(car.is_door_open(), "door closed at floor 10");
    Ok(())
}

fn mixed_calls_drain_without_early_reversal() -> Outcome {
    let mut dispatcher = Dispatcher::init();
    let requests = [
        dispatcher.add_hall_request(3, CallDirection::Up),
        dispatcher.add_car_request(6),
        dispatcher.add_hall_request(9, CallDirection::Up),
        dispatcher.add_hall_request(8, CallDirection::Down),
        dispatcher.add_hall_request(2, CallDirection::Down),
    ];
    ensure!(requests.iter().all(Result::is_ok), "a request was refused: {:?}", requests);
    run_to_completion(&mut dispatcher)?;

    let car = dispatcher.car();
    ensure!(car.current_floor() <= 3, "ended at floor {}", car.current_floor());
    ensure!(car.is_door_open() && !car.is_moving(), "car not parked with door open");
    ensure!(dispatcher.stops().is_empty(), "stops left: {:?}", dispatcher.state(1));
    Ok(())
}

fn moving_car_never_has_open_door() -> Outcome {
    let mut dispatcher = Dispatcher::init();
    let _ = dispatcher.add_hall_request(8, CallDirection::Down);
    let _ = dispatcher.add_car_request(5);
    for step in 0..40 {
        match step {
            3 => {
                dispatcher.open_door();
            }
            6 => {
                let _ = dispatcher.add_hall_request(2, CallDirection::Up);
            }
            9 => {
                dispatcher.close_door();
            }
            14 => dispatcher.set_mode(Mode::Fire),
            16 => dispatcher.set_mode(Mode::Normal),
            17 => {
                let _ = dispatcher.goto(7);
            }
            20 => dispatcher.set_power(Power::Off),
            21 => dispatcher.set_power(Power::On),
            22 => {
                let _ = dispatcher.add_hall_request(10, CallDirection::Down);
            }
            _ => {}
        }
        check_motion_invariant(dispatcher.car())?;
        dispatcher.tick();
        check_motion_invariant(dispatcher.car())?;
    }
    Ok(())
}

fn idle_tick_changes_nothing() -> Outcome {
    let mut dispatcher = Dispatcher::init();
    let before = dispatcher.clone();
    dispatcher.tick();
    ensure!(dispatcher == before, "idle tick changed {:?} into {:?}", before, dispatcher);
    Ok(())
}

fn reset_clears_overrides() -> Outcome {
    let mut dispatcher = Dispatcher::init();
    let _ = dispatcher.add_hall_request(6, CallDirection::Up);
    for _ in 0..3 {
        dispatcher.tick();
    }
    dispatcher.set_enabled(false);
    dispatcher.set_mode(Mode::Fire);
    dispatcher.set_power(Power::Off);
    dispatcher.reset();
    ensure!(dispatcher == Dispatcher::init(), "reset left {:?}", dispatcher.state(1));
    Ok(())
}

fn flag_body_bus_commands() -> Outcome {
    let mut bank = Bank::init(config::NUM_CARS);
    bank.handle(&Message::new(1, 0, encode(OP_GOTO, 6)));
    for _ in 0..3 {
        bank.tick();
    }

    bank.handle(&Message::new(5, 0, 1110));
    for state in bank.states() {
        ensure!(
            state.floor == 1 && state.door_open && state.mode == Mode::Fire,
            "car {} not recalled by TEST_FIRE: {:?}",
            state.car_id,
            state
        );
    }

    bank.handle(&Message::new(4, 0, 0));
    bank.handle(&Message::new(7, 3, 0));
    let states = bank.states();
    ensure!(states.iter().all(|state| state.mode == Mode::Normal), "CLEAR_FIRE did not reach every car");
    ensure!(states[2].power == Power::Off, "STOP-one missed car 3");
    ensure!(
        states.iter().filter(|state| state.power == Power::Off).count() == 1,
        "STOP-one reached more than car 3"
    );

    let before = bank.states();
    bank.handle(&Message::new(9, 0, 0));
    ensure!(bank.states() == before, "unknown topic changed state");
    Ok(())
}

fn opcode_bus_commands() -> Outcome {
    let mut bank = Bank::init(config::NUM_CARS);
    bank.handle(&Message::new(2, 0, encode(OP_GOTO, 5)));
    for _ in 0..10 {
        bank.tick();
    }

    let replies = bank.handle(&Message::new(2, 0, encode(OP_STATUS, 0)));
    ensure!(replies.len() == 1, "expected one STATUS reply, got {:?}", replies);
    let status = unpack_status(replies[0].arg()).ok_or("STATUS reply does not unpack")?;
    ensure!(status.floor == 5 && status.door_open && !status.moving, "car 2 reported {:?}", status);

    let before = bank.states();
    bank.handle(&Message::new(0, 0, encode(42, 0)));
    ensure!(bank.states() == before, "unknown opcode changed state");
    Ok(())
}
