use crate::config::config;

/// Counts down the ticks a door stays open at a serviced stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoorTimer {
    remaining: u32,
}

impl DoorTimer {
    pub fn init() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.remaining = config::DOOR_DWELL_TICKS;
    }

    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    pub fn is_dwelling(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn count_down(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_runs_for_configured_ticks() {
        let mut door = DoorTimer::init();
        assert!(!door.is_dwelling());

        door.start();
        for _ in 0..config::DOOR_DWELL_TICKS {
            assert!(door.is_dwelling());
            door.count_down();
        }
        assert!(!door.is_dwelling());
        door.count_down();
        assert_eq!(door.remaining(), 0);
    }

    #[test]
    fn cancel_ends_dwell() {
        let mut door = DoorTimer::init();
        door.start();
        door.cancel();
        assert!(!door.is_dwelling());
    }
}
