use crate::config::config::Floor;

/// Why a car refused a floor request. None of these are fatal; the caller
/// decides whether to drop, log or surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("invalid floor number {floor}")]
    InvalidFloor { floor: Floor },

    #[error("elevator is powered off, request denied")]
    PowerOff,

    #[error("elevator is in fire mode, floor {floor} refused (only the lobby is served)")]
    FireRestricted { floor: Floor },

    #[error("elevator is disabled and does not accept new requests")]
    Disabled,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
