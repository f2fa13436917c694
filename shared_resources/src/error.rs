//! Error taxonomy shared by intake, scheduling and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::direction::Direction;
use crate::request::Floor;

/// Outcome of a request the controller did not enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Floor outside the configured range. Nothing was mutated.
    #[error("invalid floor requested: {floor} (valid floors are {min}..={max})")]
    InvalidFloor { floor: Floor, min: Floor, max: Floor },

    /// Cab request for the floor the car is standing on. Informational,
    /// not a failure.
    #[error("elevator is already at floor {0}")]
    AlreadyAtFloor(Floor),

    /// Hall call without an up or down direction.
    #[error("hall call at floor {0} needs a direction, 'up' or 'down'")]
    MissingDirection(Floor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("no pending {0} requests")]
    Empty(Direction),
}

/// Failure of the scheduling loop itself. Never caused by external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("scheduler invariant violated: {0}")]
    Invariant(#[from] QueueError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
