use elevator_bank::distributor::distributor::Bank;
use elevator_bank::distributor::message::{
    self, encode, unpack_status, Command, Message, SystemMode, Target, OP_CLOSE, OP_DISABLE, OP_ELEV_START,
    OP_ELEV_STOP, OP_ENABLE, OP_FIRE_CLEAR, OP_FIRE_ON, OP_GOTO, OP_OPEN, OP_RESET, OP_START, OP_STATUS, OP_STOP,
};
use elevator_bank::elevator_controller::direction::Direction;
use elevator_bank::elevator_controller::elevator_fsm::Dispatcher;
use elevator_bank::elevator_controller::state::{Mode, Power};

fn ticks(bank: &mut Bank, count: usize) {
    for _ in 0..count {
        bank.tick();
    }
}

#[test]
fn both_conventions_decode_to_the_same_commands() {
    let pairs = [
        (Message::new(1, 0, 0), Message::new(0, 0, encode(OP_STOP, 0))),
        (Message::new(2, 0, 0), Message::new(0, 0, encode(OP_START, 0))),
        (Message::new(3, 0, 0), Message::new(0, 0, encode(OP_RESET, 0))),
        (Message::new(4, 0, 0), Message::new(0, 0, encode(OP_FIRE_CLEAR, 0))),
        (Message::new(5, 0, 1110), Message::new(0, 0, encode(OP_FIRE_ON, 0))),
        (Message::new(6, 2, 0), Message::new(2, 0, encode(OP_ELEV_START, 0))),
        (Message::new(7, 2, 0), Message::new(2, 0, encode(OP_ELEV_STOP, 0))),
    ];
    for (flag_body, opcode) in pairs {
        assert_eq!(message::decode(&flag_body), message::decode(&opcode), "{:?} vs {:?}", flag_body, opcode);
        assert!(message::decode(&flag_body).is_some());
    }
}

#[test]
fn opcode_only_commands() {
    let decoded = |body| message::decode(&Message::new(3, 0, body)).map(|envelope| envelope.command);
    assert_eq!(decoded(encode(OP_GOTO, 8)), Some(Command::Goto(8)));
    assert_eq!(decoded(encode(OP_OPEN, 0)), Some(Command::Open));
    assert_eq!(decoded(encode(OP_CLOSE, 0)), Some(Command::Close));
    assert_eq!(decoded(encode(OP_ENABLE, 0)), Some(Command::Enable));
    assert_eq!(decoded(encode(OP_DISABLE, 0)), Some(Command::Disable));
    assert_eq!(decoded(encode(OP_STATUS, 0)), Some(Command::Status));
}

#[test]
fn system_mode_selects_car_mode() {
    let mut bank = Bank::init(4);
    bank.handle(&Message::new(5, 0, 1100));
    assert!(bank.states().iter().all(|state| state.mode == Mode::Auto));
    bank.handle(&Message::new(5, 0, 1000));
    assert!(bank.states().iter().all(|state| state.mode == Mode::Normal));

    assert_eq!(
        message::decode(&Message::new(5, 0, 1100)).map(|envelope| envelope.command),
        Some(Command::SystemMode(SystemMode::Independent))
    );
}

#[test]
fn reset_over_the_bus_restores_every_car() {
    let mut bank = Bank::init(4);
    for car_id in 1..=4 {
        bank.handle(&Message::new(car_id, 0, encode(OP_GOTO, 10)));
    }
    ticks(&mut bank, 4);
    bank.handle(&Message::new(7, 1, 0));
    bank.handle(&Message::new(2, 0, encode(OP_DISABLE, 0)));
    bank.handle(&Message::new(0, 0, encode(OP_FIRE_ON, 0)));

    bank.handle(&Message::new(3, 0, 0));
    for car_id in 1..=4 {
        assert_eq!(bank.car(car_id).unwrap(), &Dispatcher::init());
    }
}

#[test]
fn open_and_close_over_the_bus() {
    let mut bank = Bank::init(1);
    bank.handle(&Message::new(1, 0, encode(OP_OPEN, 0)));
    assert!(bank.states()[0].door_open);
    bank.handle(&Message::new(1, 0, encode(OP_CLOSE, 0)));
    assert!(!bank.states()[0].door_open);

    bank.handle(&Message::new(1, 0, encode(OP_GOTO, 6)));
    bank.tick();
    bank.handle(&Message::new(1, 0, encode(OP_OPEN, 0)));
    assert!(bank.states()[0].moving);
    assert!(!bank.states()[0].door_open);
}

#[test]
fn fire_holds_the_door_open() {
    let mut bank = Bank::init(2);
    bank.handle(&Message::new(5, 0, 1110));
    bank.handle(&Message::new(0, 0, encode(OP_CLOSE, 0)));
    assert!(bank.states().iter().all(|state| state.door_open));

    bank.handle(&Message::new(1, 0, encode(OP_GOTO, 4)));
    ticks(&mut bank, 10);
    assert_eq!(bank.states()[0].floor, 1);
}

#[test]
fn status_reply_tracks_the_car() {
    let mut bank = Bank::init(4);
    bank.handle(&Message::new(4, 0, encode(OP_GOTO, 7)));
    ticks(&mut bank, 3);

    let replies = bank.handle(&Message::new(0, 0, encode(OP_STATUS, 0)));
    assert_eq!(replies.len(), 4);
    let reply = replies.iter().find(|reply| reply.topic == 4).unwrap();
    let status = unpack_status(reply.arg()).unwrap();
    assert_eq!(status.floor, 4);
    assert!(status.moving);
    assert!(!status.door_open);
    assert_eq!(status.direction, Direction::Up);

    // A STATUS report from a car is not a request.
    let before = bank.states();
    assert!(bank.handle(reply).is_empty());
    assert_eq!(bank.states(), before);
}

#[test]
fn fire_clear_after_stop_powers_the_car() {
    let mut bank = Bank::init(2);
    bank.handle(&Message::new(7, 1, 0));
    assert_eq!(bank.states()[0].power, Power::Off);

    bank.handle(&Message::new(4, 0, 0));
    assert_eq!(bank.states()[0].power, Power::On);
    bank.handle(&Message::new(1, 0, encode(OP_GOTO, 3)));
    ticks(&mut bank, 5);
    assert_eq!(bank.states()[0].floor, 3);
}

#[test]
fn targets_outside_the_bank_are_dropped() {
    let mut bank = Bank::init(2);
    let before = bank.states();
    assert_eq!(message::decode(&Message::new(6, 3, 0)).map(|envelope| envelope.target), Some(Target::Car(3)));
    bank.handle(&Message::new(6, 3, 0));
    bank.handle(&Message::new(1, 9, 0));
    bank.handle(&Message::new(8, 0, encode(OP_STOP, 0)));
    assert_eq!(bank.states(), before);
    assert!(bank.states().iter().all(|state| state.power == Power::On));
}
