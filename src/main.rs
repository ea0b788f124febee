use elevator_bank::config::fetch_arguments;
use elevator_bank::distributor::distributor::Runtime;
use elevator_bank::distributor::message;
use elevator_bank::distributor::script::{self, ScriptStep};
use elevator_bank::elevator_controller::state::State;

use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;

fn read_script(script: &str) -> io::Result<Vec<ScriptStep>> {
    let text = if script == "-" {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(script)?
    };
    Ok(script::parse_script(&text))
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = fetch_arguments::fetch_command_line_arguments();
    let config = args
        .sim_config()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    info!(
        "Starting {} cars, {} ticks of {} ms",
        config.num_cars, config.ticks, config.tick_period_ms
    );

    let steps = read_script(&args.script)?;
    info!("Loaded {} script steps", steps.len());
    if script::total_wait(&steps) >= config.ticks {
        warn!("Script waits longer than the {} ticks the cars run", config.ticks);
    }

    let runtime = Runtime::spawn(&config)?;
    let new_state_rx = runtime.new_state_rx.clone();
    let status_rx = runtime.status_rx.clone();

    let pacer = cbc::tick(config.tick_period());
    let sent = script::play(&steps, &runtime.message_tx, &pacer);
    info!("Sent {} bus messages", sent);
    let finished = runtime.join();

    let mut last_states: BTreeMap<u8, State> = BTreeMap::new();
    for state in new_state_rx.try_iter() {
        let changed = last_states
            .get(&state.car_id)
            .map_or(true, |last| last.behaviour != state.behaviour);
        if changed {
            debug!(
                "Car {} {} at floor {} heading {}",
                state.car_id,
                state.behaviour.to_string(),
                state.floor,
                state.direction.to_string()
            );
        }
        last_states.insert(state.car_id, state);
    }

    for reply in status_rx.try_iter() {
        match message::unpack_status(reply.arg()) {
            Some(status) => info!("STATUS car {}: {:?}", reply.topic, status),
            None => warn!("Malformed STATUS reply {}", reply.tsbbbb()),
        }
    }

    let final_states: Vec<State> = finished
        .iter()
        .map(|(car_id, dispatcher)| dispatcher.state(*car_id))
        .collect();
    info!(
        "{} of {} cars available for new requests",
        final_states.iter().filter(|state| state.is_available()).count(),
        final_states.len()
    );
    let rendered = serde_json::to_string_pretty(&final_states)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    println!("{}", rendered);

    Ok(())
}
