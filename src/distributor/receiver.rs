use crate::config::config::CarId;
use crate::distributor::message::{self, Command, Envelope, Message};

use crossbeam_channel as cbc;
use log::{debug, info, warn};

/// Decodes bus messages and hands each command to the inbox of every car it
/// addresses. Returns once every message sender is gone.
pub fn receiver(message_rx: cbc::Receiver<Message>, inboxes: Vec<(CarId, cbc::Sender<Command>)>) {
    for message in message_rx.iter() {
        match message::decode(&message) {
            Some(envelope) => {
                debug!("Routing {} as {:?}", message.tsbbbb(), envelope);
                route(&envelope, &inboxes);
            }
            None => debug!("Dropped bus message {}", message.tsbbbb()),
        }
    }
    info!("Bus closed, receiver stopping");
}

/// Delivers one command without blocking. A full inbox loses the command.
/// Returns how many inboxes took it.
pub fn route(envelope: &Envelope, inboxes: &[(CarId, cbc::Sender<Command>)]) -> usize {
    inboxes
        .iter()
        .filter(|(car_id, _)| envelope.target.includes(*car_id))
        .filter(|(car_id, inbox_tx)| match inbox_tx.try_send(envelope.command) {
            Ok(()) => true,
            Err(cbc::TrySendError::Full(command)) => {
                warn!("Inbox of car {} is full, dropping {:?}", car_id, command);
                false
            }
            Err(cbc::TrySendError::Disconnected(command)) => {
                debug!("Car {} has stopped, dropping {:?}", car_id, command);
                false
            }
        })
        .count()
}
