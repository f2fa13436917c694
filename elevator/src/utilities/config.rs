use std::path::PathBuf;

use clap::Parser;

use shared_resources::config::{ConfigFile, ConfigOverrides, ElevatorSettings};
use shared_resources::error::ConfigError;
use shared_resources::request::Floor;

/// Single-car elevator simulation driven from the console.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "elevator", version)]
#[command(about = "Simulates a single elevator car serving inside and outside requests")]
pub struct Args {
    /// JSON configuration file (default: ./config.json when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    pub min_floor: Option<Floor>,

    #[arg(long, allow_negative_numbers = true)]
    pub max_floor: Option<Floor>,

    #[arg(long, allow_negative_numbers = true)]
    pub start_floor: Option<Floor>,

    /// Time to travel one floor.
    #[arg(long, value_name = "MS")]
    pub per_floor_delay_ms: Option<u64>,

    /// Time the doors stay open at a stop.
    #[arg(long, value_name = "MS")]
    pub stop_delay_ms: Option<u64>,

    /// No delays; runs complete instantly.
    #[arg(long)]
    pub fast: bool,

    /// Redraw a status table instead of logging every event.
    #[arg(long)]
    pub table: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    pub verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            min_floor: self.min_floor,
            max_floor: self.max_floor,
            start_floor: self.start_floor,
            per_floor_delay_ms: self.per_floor_delay_ms,
            stop_delay_ms: self.stop_delay_ms,
            fast: self.fast,
        }
    }

    pub fn settings(&self) -> Result<ElevatorSettings, ConfigError> {
        let config_file = ConfigFile::read(self.config.as_deref())?;
        ElevatorSettings::new(config_file, self.overrides())
    }
}
