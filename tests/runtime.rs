use elevator_bank::config::config::SimConfig;
use elevator_bank::distributor::distributor::Runtime;
use elevator_bank::distributor::message::{encode, unpack_status, Message, OP_GOTO, OP_STATUS};
use elevator_bank::distributor::script;
use elevator_bank::elevator_controller::state::{Mode, Power};

use crossbeam_channel as cbc;

fn fast_config(ticks: u64) -> SimConfig {
    SimConfig {
        tick_period_ms: 2,
        ticks,
        ..SimConfig::default()
    }
}

#[test]
fn cars_run_independently_and_publish_states() {
    let runtime = Runtime::spawn(&fast_config(60)).unwrap();
    runtime.message_tx.send(Message::new(1, 0, encode(OP_GOTO, 7))).unwrap();
    runtime.message_tx.send(Message::new(3, 0, encode(OP_GOTO, 4))).unwrap();
    runtime.message_tx.send(Message::new(7, 4, 0)).unwrap();
    let new_state_rx = runtime.new_state_rx.clone();

    let mut finished = runtime.join();
    finished.sort_by_key(|(car_id, _)| *car_id);
    assert_eq!(finished.len(), 4);

    let floors: Vec<_> = finished.iter().map(|(_, dispatcher)| dispatcher.car().current_floor()).collect();
    assert_eq!(floors, vec![7, 1, 4, 1]);
    assert_eq!(finished[3].1.car().power(), Power::Off);
    assert!(finished.iter().all(|(_, dispatcher)| dispatcher.stops().is_empty()));

    let states: Vec<_> = new_state_rx.try_iter().collect();
    assert_eq!(states.len(), 4 * 60);
    for state in &states {
        assert!(!(state.moving && state.door_open));
    }
}

#[test]
fn broadcast_fire_reaches_every_car() {
    let runtime = Runtime::spawn(&fast_config(30)).unwrap();
    runtime.message_tx.send(Message::new(5, 0, 1110)).unwrap();
    let finished = runtime.join();
    for (_, dispatcher) in &finished {
        assert_eq!(dispatcher.car().mode(), Mode::Fire);
        assert_eq!(dispatcher.car().current_floor(), 1);
        assert!(dispatcher.car().is_door_open());
    }
}

#[test]
fn status_requests_are_answered() {
    let runtime = Runtime::spawn(&fast_config(30)).unwrap();
    runtime.message_tx.send(Message::new(2, 0, encode(OP_STATUS, 0))).unwrap();
    runtime.message_tx.send(Message::new(99, 0, 0)).unwrap();
    let status_rx = runtime.status_rx.clone();
    runtime.join();

    let replies: Vec<_> = status_rx.try_iter().collect();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].topic, 2);
    let status = unpack_status(replies[0].arg()).unwrap();
    assert_eq!(status.floor, 1);
    assert!(!status.moving);
}

#[test]
fn configured_car_count_is_respected() {
    let config = SimConfig {
        num_cars: 2,
        ..fast_config(5)
    };
    let runtime = Runtime::spawn(&config).unwrap();
    assert_eq!(runtime.join().len(), 2);
}

#[test]
fn paced_script_fires_while_a_car_travels() {
    let config = fast_config(80);
    let steps = script::parse_script(&format!("1 0 {}\nwait 4\n5 0 1110\n", encode(OP_GOTO, 10)));
    let runtime = Runtime::spawn(&config).unwrap();
    let new_state_rx = runtime.new_state_rx.clone();

    let pacer = cbc::tick(config.tick_period());
    assert_eq!(script::play(&steps, &runtime.message_tx, &pacer), 2);
    let finished = runtime.join();

    let car_one: Vec<_> = new_state_rx.try_iter().filter(|state| state.car_id == 1).collect();
    assert!(car_one.iter().any(|state| state.moving && state.mode == Mode::Normal));
    let (_, dispatcher) = finished.iter().find(|(car_id, _)| *car_id == 1).unwrap();
    assert_eq!(dispatcher.car().mode(), Mode::Fire);
    assert_eq!(dispatcher.car().current_floor(), 1);
}
