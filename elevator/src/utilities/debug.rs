use std::io::{stdout, Stdout, Write};

use crossbeam_channel::{Receiver, Sender};
use crossterm::{cursor, terminal, ExecutableCommand, Result};
use tracing::{info, warn};

use shared_resources::config::ElevatorSettings;
use shared_resources::direction::Direction;
use shared_resources::status::StatusEvent;

use super::elevator_status::ElevatorStatus;
use crate::modules::fsm::Elevator;

/// Receiver of the controller's state change notifications.
pub trait StatusSink {
    fn notify(&mut self, event: StatusEvent);
}

impl StatusSink for Vec<StatusEvent> {
    fn notify(&mut self, event: StatusEvent) {
        self.push(event);
    }
}

impl StatusSink for Sender<StatusEvent> {
    fn notify(&mut self, event: StatusEvent) {
        // display thread gone, the run itself does not depend on it
        let _ = self.send(event);
    }
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn notify(&mut self, event: StatusEvent) {
        (**self).notify(event)
    }
}

/// One log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn notify(&mut self, event: StatusEvent) {
        info!(?event, "{}", event);
    }
}

const STATUS_ROWS: u16 = 16;

/// Terminal rows taken by one table, saturating for very tall buildings.
fn table_rows(num_floors: usize) -> u16 {
    let floor_rows = u16::try_from(num_floors.saturating_mul(2)).unwrap_or(u16::MAX);
    STATUS_ROWS.saturating_add(floor_rows)
}

/// Redraws a table of pending requests and car state in place.
pub struct StatusTable {
    stdout: Stdout,
    settings: ElevatorSettings,
    drawn_rows: u16,
}

impl StatusTable {
    pub fn new(settings: ElevatorSettings) -> Self {
        StatusTable {
            stdout: stdout(),
            settings,
            drawn_rows: 0,
        }
    }

    pub fn printstatus(&mut self, status: &ElevatorStatus, event: &StatusEvent) -> Result<()> {
        if self.drawn_rows > 0 {
            self.stdout.execute(cursor::MoveUp(self.drawn_rows))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

        writeln!(self.stdout, "+---------------------------------------------------+")?;
        writeln!(self.stdout, "| PENDING REQUESTS                                  |")?;
        writeln!(self.stdout, "+------------+------------+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} | {2:<10} | {3:<10} |", "FLOOR", "UP", "DOWN", "CAR")?;
        for floor in (self.settings.min_floor..=self.settings.max_floor).rev() {
            writeln!(self.stdout, "+------------+------------+------------+------------+")?;
            writeln!(
                self.stdout,
                "| {0:<10} | {1:<10} | {2:<10} | {3:<10} |",
                floor,
                status.requests.contains(Direction::Up, floor),
                status.requests.contains(Direction::Down, floor),
                if status.floor == floor { "[ ]" } else { "" },
            )?;
        }
        writeln!(self.stdout, "+------------+------------+------------+------------+\n")?;

        writeln!(self.stdout, "+-------------------------+")?;
        writeln!(self.stdout, "| STATE MACHINE           |")?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "STATE", status.behaviour.as_string())?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "FLOOR", status.floor)?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "DIRECTION", status.direction.as_string())?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "{}", event)?;

        self.drawn_rows = table_rows(self.settings.num_floors());
        Ok(())
    }
}

/// Display thread: shows every status event until all senders are gone.
pub fn main(elevator: Elevator, status_rx: Receiver<StatusEvent>, mut table: bool) {
    let mut log = LogSink;
    let mut status_table = StatusTable::new(elevator.settings().clone());

    for event in status_rx.iter() {
        if !table {
            log.notify(event);
            continue;
        }
        if let Err(e) = status_table.printstatus(&elevator.status(), &event) {
            warn!("status table unavailable, falling back to log output: {}", e);
            table = false;
            log.notify(event);
        }
    }
}
