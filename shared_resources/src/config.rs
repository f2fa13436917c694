//! Elevator configuration.
//!
//! Settings are layered: built-in defaults, then an optional JSON file,
//! then command-line overrides. The file uses camelCase keys:
//!
//! ```json
//! { "minFloor": 1, "maxFloor": 10, "startFloor": 1, "perFloorDelayMs": 2000, "stopDelayMs": 2000 }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::ConfigError;
use crate::request::Floor;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

pub const DEFAULT_MIN_FLOOR: Floor = 1;
pub const DEFAULT_MAX_FLOOR: Floor = 10;
pub const DEFAULT_DELAY_MS: u64 = 2000;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub start_floor: Option<Floor>,
    pub per_floor_delay_ms: u64,
    pub stop_delay_ms: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            min_floor: DEFAULT_MIN_FLOOR,
            max_floor: DEFAULT_MAX_FLOOR,
            start_floor: None,
            per_floor_delay_ms: DEFAULT_DELAY_MS,
            stop_delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Reads `path` if given. Otherwise reads `config.json` from the working
    /// directory when it exists, falling back to the defaults.
    pub fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if !default_path.exists() {
                    info!("No configuration file provided, using default settings...");
                    return Ok(ConfigFile::default());
                }
                default_path
            }
        };
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {:?}", path);
        Self::parse(&contents)
    }
}

/// Command-line layer. `None` keeps the value from the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub min_floor: Option<Floor>,
    pub max_floor: Option<Floor>,
    pub start_floor: Option<Floor>,
    pub per_floor_delay_ms: Option<u64>,
    pub stop_delay_ms: Option<u64>,
    /// Zero both delays.
    pub fast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSettings {
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub start_floor: Floor,
    pub per_floor_delay: Duration,
    pub stop_delay: Duration,
}

impl Default for ElevatorSettings {
    fn default() -> Self {
        ElevatorSettings {
            min_floor: DEFAULT_MIN_FLOOR,
            max_floor: DEFAULT_MAX_FLOOR,
            start_floor: DEFAULT_MIN_FLOOR,
            per_floor_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            stop_delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl ElevatorSettings {
    pub fn new(file: ConfigFile, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let min_floor = overrides.min_floor.unwrap_or(file.min_floor);
        let max_floor = overrides.max_floor.unwrap_or(file.max_floor);
        let start_floor = overrides.start_floor.or(file.start_floor).unwrap_or(min_floor);
        let (per_floor_delay_ms, stop_delay_ms) = if overrides.fast {
            (0, 0)
        } else {
            (
                overrides.per_floor_delay_ms.unwrap_or(file.per_floor_delay_ms),
                overrides.stop_delay_ms.unwrap_or(file.stop_delay_ms),
            )
        };

        let settings = ElevatorSettings {
            min_floor,
            max_floor,
            start_floor,
            per_floor_delay: Duration::from_millis(per_floor_delay_ms),
            stop_delay: Duration::from_millis(stop_delay_ms),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Settings for a building with the given range, starting at the bottom
    /// floor and without any pacing.
    pub fn instant(min_floor: Floor, max_floor: Floor) -> Self {
        ElevatorSettings {
            min_floor,
            max_floor,
            start_floor: min_floor,
            per_floor_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
        }
    }

    pub fn with_start_floor(mut self, start_floor: Floor) -> Self {
        self.start_floor = start_floor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_floor > self.max_floor {
            return Err(ConfigError::Invalid(format!(
                "minFloor {} is above maxFloor {}",
                self.min_floor, self.max_floor
            )));
        }
        if !self.contains(self.start_floor) {
            return Err(ConfigError::Invalid(format!(
                "startFloor {} is outside {}..={}",
                self.start_floor, self.min_floor, self.max_floor
            )));
        }
        Ok(())
    }

    pub fn contains(&self, floor: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    pub fn num_floors(&self) -> usize {
        let floors = i64::from(self.max_floor) - i64::from(self.min_floor) + 1;
        usize::try_from(floors).unwrap_or(0)
    }
}
