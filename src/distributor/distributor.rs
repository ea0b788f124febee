use crate::config::config::{CarId, SimConfig};
use crate::distributor::message::{self, Command, Envelope, Message, SystemMode};
use crate::distributor::receiver;
use crate::elevator_controller::elevator_fsm::Dispatcher;
use crate::elevator_controller::state::{Mode, Power, State};

use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Applies one decoded command to a car. Only STATUS produces a reply.
pub fn apply_command(dispatcher: &mut Dispatcher, car_id: CarId, command: Command) -> Option<Message> {
    debug!("Car {} applying {:?}", car_id, command);
    match command {
        Command::Start => dispatcher.set_power(Power::On),
        Command::Stop => dispatcher.set_power(Power::Off),
        Command::Reset => dispatcher.reset(),
        Command::FireOn => dispatcher.set_mode(Mode::Fire),
        Command::FireClear => dispatcher.set_mode(Mode::Normal),
        Command::Goto(floor) => {
            if let Err(e) = dispatcher.add_car_request(floor) {
                warn!("Car {} refused GOTO {}: {}", car_id, floor, e);
            }
        }
        Command::Open => {
            if !dispatcher.open_door() {
                debug!("Car {} ignored OPEN while moving", car_id);
            }
        }
        Command::Close => {
            if !dispatcher.close_door() {
                debug!("Car {} ignored CLOSE", car_id);
            }
        }
        Command::Enable => dispatcher.set_enabled(true),
        Command::Disable => dispatcher.set_enabled(false),
        Command::Status => return Some(Message::status(&dispatcher.state(car_id))),
        Command::SystemMode(system_mode) => {
            if dispatcher.car().mode() == Mode::Fire {
                debug!("Car {} stays in fire mode, ignoring {:?}", car_id, system_mode);
            } else {
                dispatcher.set_mode(match system_mode {
                    SystemMode::Centralized => Mode::Normal,
                    SystemMode::Independent => Mode::Auto,
                });
            }
        }
    }
    None
}

/// All cars of one building driven from a single thread.
#[derive(Debug, Clone)]
pub struct Bank {
    cars: Vec<Dispatcher>,
}

impl Bank {
    pub fn init(num_cars: u8) -> Self {
        Self {
            cars: (0..num_cars).map(|_| Dispatcher::init()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Cars are numbered from 1, as on the bus.
    pub fn car(&self, car_id: CarId) -> Option<&Dispatcher> {
        self.cars.get((car_id as usize).checked_sub(1)?)
    }

    pub fn car_mut(&mut self, car_id: CarId) -> Option<&mut Dispatcher> {
        self.cars.get_mut((car_id as usize).checked_sub(1)?)
    }

    /// Decodes and applies a raw bus message. Unknown messages are dropped.
    pub fn handle(&mut self, message: &Message) -> Vec<Message> {
        match message::decode(message) {
            Some(envelope) => self.apply(envelope),
            None => {
                debug!("Dropped bus message {}", message.tsbbbb());
                Vec::new()
            }
        }
    }

    pub fn apply(&mut self, envelope: Envelope) -> Vec<Message> {
        self.cars
            .iter_mut()
            .enumerate()
            .map(|(index, dispatcher)| (index as CarId + 1, dispatcher))
            .filter(|(car_id, _)| envelope.target.includes(*car_id))
            .filter_map(|(car_id, dispatcher)| apply_command(dispatcher, car_id, envelope.command))
            .collect()
    }

    pub fn tick(&mut self) {
        self.cars.iter_mut().for_each(Dispatcher::tick);
    }

    pub fn states(&self) -> Vec<State> {
        self.cars
            .iter()
            .enumerate()
            .map(|(index, dispatcher)| dispatcher.state(index as CarId + 1))
            .collect()
    }
}

/// Owns one car for `ticks` ticks. Before every tick the inbox is drained
/// and its commands applied, so the dispatcher is only ever touched from
/// this thread.
pub fn car_loop(
    car_id: CarId,
    mut dispatcher: Dispatcher,
    inbox_rx: cbc::Receiver<Command>,
    ticker: cbc::Receiver<Instant>,
    ticks: u64,
    new_state_tx: cbc::Sender<State>,
    status_tx: cbc::Sender<Message>,
) -> Dispatcher {
    info!("Car {} running for {} ticks", car_id, ticks);
    for _ in 0..ticks {
        cbc::select! {
            recv(ticker) -> tick => {
                if tick.is_err() {
                    break;
                }
            }
        }

        for command in inbox_rx.try_iter() {
            if let Some(reply) = apply_command(&mut dispatcher, car_id, command) {
                let _ = status_tx.send(reply);
            }
        }

        dispatcher.tick();
        let _ = new_state_tx.send(dispatcher.state(car_id));
    }
    info!("Car {} stopped at floor {}", car_id, dispatcher.car().current_floor());
    dispatcher
}

/// Threads of a running bank: one receiver and one loop per car.
pub struct Runtime {
    pub message_tx: cbc::Sender<Message>,
    pub new_state_rx: cbc::Receiver<State>,
    pub status_rx: cbc::Receiver<Message>,
    receiver_handle: JoinHandle<()>,
    car_handles: Vec<(CarId, JoinHandle<Dispatcher>)>,
}

impl Runtime {
    pub fn spawn(config: &SimConfig) -> std::io::Result<Self> {
        let (message_tx, message_rx) = cbc::unbounded::<Message>();
        let (new_state_tx, new_state_rx) = cbc::unbounded::<State>();
        let (status_tx, status_rx) = cbc::unbounded::<Message>();

        let mut inboxes = Vec::new();
        let mut car_handles = Vec::new();
        for car_id in 1..=config.num_cars {
            let (inbox_tx, inbox_rx) = cbc::bounded::<Command>(config.inbox_capacity);
            inboxes.push((car_id, inbox_tx));

            let ticker = cbc::tick(config.tick_period());
            let ticks = config.ticks;
            let new_state_tx = new_state_tx.clone();
            let status_tx = status_tx.clone();
            let handle = thread::Builder::new().name(format!("car-{}", car_id)).spawn(move || {
                car_loop(car_id, Dispatcher::init(), inbox_rx, ticker, ticks, new_state_tx, status_tx)
            })?;
            car_handles.push((car_id, handle));
        }

        let receiver_handle = thread::Builder::new()
            .name("receiver".to_string())
            .spawn(move || receiver::receiver(message_rx, inboxes))?;

        Ok(Self {
            message_tx,
            new_state_rx,
            status_rx,
            receiver_handle,
            car_handles,
        })
    }

    /// Stops accepting messages and waits for every car to finish its ticks.
    pub fn join(self) -> Vec<(CarId, Dispatcher)> {
        drop(self.message_tx);
        if self.receiver_handle.join().is_err() {
            warn!("Receiver thread panicked");
        }
        self.car_handles
            .into_iter()
            .filter_map(|(car_id, handle)| match handle.join() {
                Ok(dispatcher) => Some((car_id, dispatcher)),
                Err(_) => {
                    warn!("Car {} thread panicked", car_id);
                    None
                }
            })
            .collect()
    }
}
