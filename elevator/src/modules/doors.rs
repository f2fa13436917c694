/// ----- DOORS MODULE -----
/// Pacing for the simulated car. Every unit of movement and every door
/// cycle waits on a clock; the wait is the only place a run can be
/// interrupted.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, unbounded, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Elapsed,
    Cancelled,
}

pub trait Clock {
    fn wait(&mut self, duration: Duration) -> Pace;
}

/// Waits in real time. A message on the shutdown channel ends the current
/// wait early and cancels the run.
pub struct ThreadClock {
    shutdown_rx: Receiver<()>,
}

impl ThreadClock {
    pub fn init() -> (Sender<()>, Self) {
        let (shutdown_tx, shutdown_rx) = unbounded();
        (shutdown_tx, ThreadClock { shutdown_rx })
    }

    pub fn new(shutdown_rx: Receiver<()>) -> Self {
        ThreadClock { shutdown_rx }
    }
}

impl Clock for ThreadClock {
    fn wait(&mut self, duration: Duration) -> Pace {
        select! {
            recv(self.shutdown_rx) -> msg => match msg {
                Ok(()) => Pace::Cancelled,
                // nobody can cancel anymore, keep pacing
                Err(_) => {
                    thread::sleep(duration);
                    Pace::Elapsed
                }
            },
            default(duration) => Pace::Elapsed,
        }
    }
}

/// Virtual time. Never blocks; records how much time the run would have
/// taken.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    elapsed: Duration,
    waits: usize,
    cancel_after: Option<usize>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        SimulatedClock::default()
    }

    /// Cancels the run on wait number `waits + 1`.
    pub fn cancel_after(waits: usize) -> Self {
        SimulatedClock { cancel_after: Some(waits), ..Default::default() }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl Clock for SimulatedClock {
    fn wait(&mut self, duration: Duration) -> Pace {
        if self.cancel_after.is_some_and(|limit| self.waits >= limit) {
            return Pace::Cancelled;
        }
        self.waits += 1;
        self.elapsed += duration;
        Pace::Elapsed
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn wait(&mut self, duration: Duration) -> Pace {
        (**self).wait(duration)
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn wait(&mut self, duration: Duration) -> Pace {
        (**self).wait(duration)
    }
}
