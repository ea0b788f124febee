use crate::config::config::SimConfig;
use crate::error::ConfigError;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "elevator-bank", about = "Runs a bank of simulated elevator cars from a bus message script")]
pub struct Args {
    /// JSON file with simulation settings
    #[arg(long, short, default_value = "config.json")]
    pub config: PathBuf,

    /// File with one `topic subtopic body` message per line, `-` for stdin
    #[arg(long, short, default_value = "-")]
    pub script: String,

    /// Overrides the number of ticks to run
    #[arg(long, short)]
    pub ticks: Option<u64>,

    /// Overrides the tick period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

impl Args {
    /// Loads the config file and applies command-line overrides on top.
    pub fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        let mut config = SimConfig::load(&self.config)?;
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_period_ms = tick_ms;
        }
        Ok(config)
    }
}

pub fn fetch_command_line_arguments() -> Args {
    Args::parse()
}
