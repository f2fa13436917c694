/// ----- I/O MODULE -----
/// This module reads console commands on its own thread and hands them to
/// the main loop over a channel. Parsing is kept apart from reading so any
/// other front end can produce the same commands.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::debug;

use shared_resources::direction::Direction;
use shared_resources::request::{Floor, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Submit(Request),
    Start,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid request type '{0}'. Please enter 'inside', 'outside', 'start', 'status' or 'quit'")]
    Unknown(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a floor number")]
    NotAFloor(String),

    #[error("invalid direction '{0}'. Please enter 'up' or 'down'")]
    InvalidDirection(String),

    #[error("unexpected trailing input '{0}'")]
    Trailing(String),
}

fn parse_floor(word: Option<&str>) -> Result<Floor, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("floor number"))?;
    word.parse::<Floor>().map_err(|_| CommandError::NotAFloor(word.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    /// `inside <floor>`, `outside <floor> <up|down>`, `start`, `status`,
    /// `quit`. Case-insensitive.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default();

        let command = match keyword {
            "inside" => Command::Submit(Request::cab(parse_floor(words.next())?)),
            "outside" => {
                let floor = parse_floor(words.next())?;
                let word = words.next().ok_or(CommandError::MissingArgument("direction (up/down)"))?;
                let request = Direction::parse(word)
                    .and_then(|direction| Request::hall(floor, direction))
                    .ok_or_else(|| CommandError::InvalidDirection(word.to_string()))?;
                Command::Submit(request)
            }
            "start" => Command::Start,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        let rest: Vec<&str> = words.collect();
        if !rest.is_empty() {
            return Err(CommandError::Trailing(rest.join(" ")));
        }
        Ok(command)
    }
}

/// Forwards one parsed command per non-empty line until the input ends or
/// the receiver goes away.
pub fn read_commands<R: BufRead>(reader: R, command_tx: Sender<Result<Command, CommandError>>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("stopped reading commands: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if command_tx.send(line.parse()).is_err() {
            break;
        }
    }
}

/// Spawns the stdin reader. The returned channel disconnects at end of input.
pub fn init() -> io::Result<Receiver<Result<Command, CommandError>>> {
    let (command_tx, command_rx) = unbounded();
    thread::Builder::new()
        .name("stdin_commands".to_string())
        .spawn(move || read_commands(io::stdin().lock(), command_tx))?;
    Ok(command_rx)
}
