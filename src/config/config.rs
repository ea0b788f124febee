use crate::error::ConfigError;

use log::info;
use serde;
use std::fs;
use std::path;
use std::time;

pub type Floor = i32;
pub type CarId = u8;

pub const MIN_FLOOR: Floor = 1;
pub const MAX_FLOOR: Floor = 10;
pub const RECALL_FLOOR: Floor = MIN_FLOOR;

pub const NUM_CARS: u8 = 4;

pub const DOOR_DWELL_TICKS: u32 = 2;

pub const INBOX_CAPACITY: usize = 64;
pub const TICK_PERIOD: time::Duration = time::Duration::from_millis(500);
pub const DEFAULT_TICKS: u64 = 200;

pub fn is_valid_floor(floor: Floor) -> bool {
    (MIN_FLOOR..=MAX_FLOOR).contains(&floor)
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub num_cars: u8,
    pub tick_period_ms: u64,
    pub inbox_capacity: usize,
    pub ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_cars: NUM_CARS,
            tick_period_ms: TICK_PERIOD.as_millis() as u64,
            inbox_capacity: INBOX_CAPACITY,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl SimConfig {
    /// Reads a JSON config file. A missing file yields the defaults, a file
    /// that exists but does not parse is an error.
    pub fn load(file_path: &path::Path) -> Result<Self, ConfigError> {
        let config_contents = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration file at {}, using default settings", file_path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config: SimConfig = serde_json::from_str(&config_contents)?;
        Ok(config.clamped())
    }

    pub fn tick_period(&self) -> time::Duration {
        time::Duration::from_millis(self.tick_period_ms)
    }

    // Bus addressing only knows cars 1..=4 and a zero-capacity channel would
    // turn every inbox into a rendezvous point.
    fn clamped(mut self) -> Self {
        self.num_cars = self.num_cars.clamp(1, NUM_CARS);
        self.inbox_capacity = self.inbox_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SimConfig::load(path::Path::new("does/not/exist.json")).unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_fields() {
        let file_path = std::env::temp_dir().join("elevator_bank_partial_config.json");
        let mut file = fs::File::create(&file_path).unwrap();
        write!(file, r#"{{ "num_cars": 2, "ticks": 40 }}"#).unwrap();

        let config = SimConfig::load(&file_path).unwrap();
        assert_eq!(config.num_cars, 2);
        assert_eq!(config.ticks, 40);
        assert_eq!(config.inbox_capacity, INBOX_CAPACITY);
        let _ = fs::remove_file(&file_path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file_path = std::env::temp_dir().join("elevator_bank_bad_config.json");
        fs::write(&file_path, "{ num_cars: ").unwrap();

        assert!(matches!(SimConfig::load(&file_path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&file_path);
    }

    #[test]
    fn car_count_is_clamped_to_bus_range() {
        let config = SimConfig { num_cars: 9, inbox_capacity: 0, ..SimConfig::default() }.clamped();
        assert_eq!(config.num_cars, NUM_CARS);
        assert_eq!(config.inbox_capacity, 1);
    }

    #[test]
    fn floor_bounds() {
        assert!(is_valid_floor(1));
        assert!(is_valid_floor(10));
        assert!(!is_valid_floor(0));
        assert!(!is_valid_floor(11));
        assert!(!is_valid_floor(-1));
    }
}
