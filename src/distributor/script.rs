//! Message scripts fed to a running bank.
//!
//! One step per line: a `topic subtopic body` bus message, or `wait N`
//! (also spelled `tick N`) to hold back the following messages for N tick
//! periods. Blank lines and `#` comments are skipped.

use crate::distributor::message::Message;

use crossbeam_channel as cbc;
use log::{debug, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Send(Message),
    Wait(u64),
}

pub fn parse_step(line: &str) -> Option<ScriptStep> {
    let mut words = line.split_whitespace();
    match words.next()? {
        "wait" | "tick" => {
            let ticks = words.next()?.parse().ok()?;
            match words.next() {
                Some(_) => None,
                None => Some(ScriptStep::Wait(ticks)),
            }
        }
        _ => Message::parse_line(line).map(ScriptStep::Send),
    }
}

/// Parses a whole script. Unreadable lines are logged and skipped.
pub fn parse_script(text: &str) -> Vec<ScriptStep> {
    text.lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let step = parse_step(line);
            if step.is_none() {
                warn!("Skipping unreadable script line {}: {:?}", number + 1, line);
            }
            step
        })
        .collect()
}

/// Number of tick periods the script waits in total.
pub fn total_wait(steps: &[ScriptStep]) -> u64 {
    steps
        .iter()
        .map(|step| match step {
            ScriptStep::Wait(ticks) => *ticks,
            ScriptStep::Send(_) => 0,
        })
        .sum()
}

/// Sends the script onto the bus, waiting on `pacer` for every `wait`
/// tick. Stops early if the bus or the pacer disconnects. Returns the
/// number of messages sent.
pub fn play(steps: &[ScriptStep], message_tx: &cbc::Sender<Message>, pacer: &cbc::Receiver<Instant>) -> usize {
    let mut sent = 0;
    for step in steps {
        match step {
            ScriptStep::Send(message) => {
                debug!("Bus <- {}", message.tsbbbb());
                if message_tx.send(*message).is_err() {
                    warn!("Receiver stopped early, remaining messages dropped");
                    return sent;
                }
                sent += 1;
            }
            ScriptStep::Wait(ticks) => {
                for _ in 0..*ticks {
                    if pacer.recv().is_err() {
                        warn!("Pacer stopped, remaining script dropped");
                        return sent;
                    }
                }
            }
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_waits() {
        let steps = parse_script(
            "# fire while car 1 travels\n\
             1, 0, 393226\n\
             wait 3\n\
             \n\
             5 0 1110\n\
             tick 2\n",
        );
        assert_eq!(
            steps,
            vec![
                ScriptStep::Send(Message::new(1, 0, 393226)),
                ScriptStep::Wait(3),
                ScriptStep::Send(Message::new(5, 0, 1110)),
                ScriptStep::Wait(2),
            ]
        );
        assert_eq!(total_wait(&steps), 5);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert_eq!(parse_step("wait"), None);
        assert_eq!(parse_step("wait -1"), None);
        assert_eq!(parse_step("wait 2 3"), None);
        assert_eq!(parse_step("1 2"), None);
        assert_eq!(parse_script("bogus\n6 1 0\n"), vec![ScriptStep::Send(Message::new(6, 1, 0))]);
    }

    #[test]
    fn play_waits_for_pacer_between_messages() {
        let steps = parse_script("2 0 0\nwait 2\n1 0 0\n");
        let (message_tx, message_rx) = cbc::unbounded();
        let (pace_tx, pacer) = cbc::unbounded();
        pace_tx.send(Instant::now()).unwrap();

        // One pace is missing, so the second message is never reached.
        drop(pace_tx);
        assert_eq!(play(&steps, &message_tx, &pacer), 1);
        assert_eq!(message_rx.try_iter().collect::<Vec<_>>(), vec![Message::new(2, 0, 0)]);
    }

    #[test]
    fn play_sends_everything_once_paced() {
        let steps = parse_script("2 0 0\nwait 2\n1 0 0\n");
        let (message_tx, message_rx) = cbc::unbounded();
        let (pace_tx, pacer) = cbc::unbounded();
        for _ in 0..2 {
            pace_tx.send(Instant::now()).unwrap();
        }
        assert_eq!(play(&steps, &message_tx, &pacer), 2);
        assert_eq!(message_rx.len(), 2);
    }
}
