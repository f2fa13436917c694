/// ----- SIMULATION MODULE -----
/// Sequences request intake and runs of the controller. A run executes on
/// its own thread so requests keep coming in while the car moves; the
/// result is delivered on `done_rx`.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::{info, warn};

use shared_resources::error::{ControllerError, RequestError};
use shared_resources::request::Request;

use crate::modules::doors::{Clock, SimulatedClock, ThreadClock};
use crate::modules::fsm::{Elevator, RunOutcome};
use crate::utilities::debug::StatusSink;

pub type RunResult = Result<RunOutcome, ControllerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep for the configured delays; runs can be cancelled.
    RealTime,
    /// Virtual time, runs finish immediately.
    Simulated,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("elevator is already running")]
    AlreadyRunning,

    #[error("failed to spawn run thread: {0}")]
    Spawn(#[from] io::Error),
}

struct Worker {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Simulation {
    elevator: Elevator,
    pacing: Pacing,
    done_tx: Sender<RunResult>,
    done_rx: Receiver<RunResult>,
    worker: Option<Worker>,
}

impl Simulation {
    pub fn new(elevator: Elevator, pacing: Pacing) -> Self {
        let (done_tx, done_rx) = unbounded();
        Simulation {
            elevator,
            pacing,
            done_tx,
            done_rx,
            worker: None,
        }
    }

    pub fn elevator(&self) -> &Elevator {
        &self.elevator
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Passes a request to the controller and logs the verdict.
    pub fn submit(&self, request: Request) -> Result<(), RequestError> {
        let result = self.elevator.submit(request);
        match &result {
            Ok(()) => info!("Accepted {:?} request for floor {}", request.call, request.floor),
            Err(e @ RequestError::AlreadyAtFloor(_)) => info!("{}", e),
            Err(e) => warn!("Rejected request: {}", e),
        }
        result
    }

    /// Starts a run on a worker thread.
    pub fn start<S>(&mut self, sink: S) -> Result<(), SimulationError>
    where
        S: StatusSink + Send + 'static,
    {
        if self.worker.is_some() {
            return Err(SimulationError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = unbounded();
        let mut clock: Box<dyn Clock + Send> = match self.pacing {
            Pacing::RealTime => Box::new(ThreadClock::new(shutdown_rx)),
            Pacing::Simulated => Box::new(SimulatedClock::new()),
        };
        let elevator = self.elevator.clone();
        let done_tx = self.done_tx.clone();
        let mut sink = sink;

        let handle = thread::Builder::new().name("elevator_run".to_string()).spawn(move || {
            let result = elevator.run(&mut clock, &mut sink);
            let _ = done_tx.send(result);
        })?;

        self.worker = Some(Worker { shutdown_tx, handle });
        Ok(())
    }

    /// Completion channel for `select!` in the owning loop. Call `finish`
    /// after a result has been received from it.
    pub fn done_rx(&self) -> &Receiver<RunResult> {
        &self.done_rx
    }

    pub fn finish(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.handle.join().is_err() {
                warn!("elevator run thread panicked");
            }
        }
    }

    /// Blocks until the current run returns. `None` if nothing is running.
    pub fn wait(&mut self) -> Option<RunResult> {
        self.worker.as_ref()?;
        let result = self.done_rx.recv().ok();
        self.finish();
        result
    }

    /// Cancels the current run between two floors and waits for it.
    pub fn shutdown(&mut self) -> Option<RunResult> {
        if let Some(worker) = &self.worker {
            let _ = worker.shutdown_tx.send(());
        }
        self.wait()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}
