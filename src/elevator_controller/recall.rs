//! Power and fire overrides.
//!
//! An override discards every pending stop and recalls the car to the
//! lobby before the setter returns, without waiting for future ticks.

use crate::elevator_controller::elevator_fsm::Dispatcher;
use crate::elevator_controller::state::{Mode, Power};

use log::info;

pub fn apply_power(dispatcher: &mut Dispatcher, power: Power) {
    if power == Power::Off {
        discard_pending(dispatcher);
    } else if dispatcher.car().power() == Power::Off {
        info!("Power restored at floor {}", dispatcher.car().current_floor());
    }
    dispatcher.car_mut().set_power(power);
}

pub fn apply_mode(dispatcher: &mut Dispatcher, mode: Mode) {
    if mode == Mode::Fire {
        discard_pending(dispatcher);
    }
    dispatcher.car_mut().set_mode(mode);
}

/// Clears every override and parks the car at the lobby with the door
/// closed, as if freshly created.
pub fn reset(dispatcher: &mut Dispatcher) {
    discard_pending(dispatcher);
    dispatcher.car_mut().reset();
    info!("Car reset");
}

fn discard_pending(dispatcher: &mut Dispatcher) {
    let up = dispatcher.stops().up_stops();
    let down = dispatcher.stops().down_stops();
    if !up.is_empty() || !down.is_empty() {
        info!("Discarding pending stops up={:?} down={:?}", up, down);
    }
    dispatcher.clear_requests();
}
