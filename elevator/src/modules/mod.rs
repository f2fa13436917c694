use std::error::Error;
use std::thread;

use clap::Parser;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use shared_resources::status::StatusEvent;

use crate::utilities::config::Args;
use crate::utilities::debug;

pub mod doors;
pub mod fsm;
pub mod io;
pub mod simulation;

use fsm::Elevator;
use io::{Command, CommandError};
use simulation::{Pacing, Simulation, SimulationError};

fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    // READ CONFIGURATION
    let args = Args::parse();
    setup_tracing(&args);
    let settings = args.settings()?;
    info!(
        "Floors {}..={}, starting at floor {}",
        settings.min_floor, settings.max_floor, settings.start_floor
    );

    let elevator = Elevator::new(settings)?;
    let pacing = if args.fast { Pacing::Simulated } else { Pacing::RealTime };
    let mut simulation = Simulation::new(elevator.clone(), pacing);

    // INITIALIZE INPUTS MODULE
    let command_rx = io::init()?;

    // INITIALIZE DEBUG MODULE
    let (status_tx, status_rx) = unbounded();
    let debug_handle = {
        let elevator = elevator.clone();
        let table = args.table;
        thread::Builder::new()
            .name("debug".to_string())
            .spawn(move || debug::main(elevator, status_rx, table))?
    };

    println!("=== Elevator Simulation Started ===");
    println!("Commands: inside <floor> | outside <floor> <up|down> | start | status | quit");

    let result = drive(&mut simulation, &command_rx, &status_tx);

    drop(simulation);
    drop(status_tx);
    let _ = debug_handle.join();
    result
}

/// Main loop: executes console commands until `quit` or end of input. End of
/// input lets an active run finish, `quit` cancels it.
pub fn drive(
    simulation: &mut Simulation,
    command_rx: &Receiver<Result<Command, CommandError>>,
    status_tx: &Sender<StatusEvent>,
) -> Result<(), Box<dyn Error>> {
    let done_rx = simulation.done_rx().clone();

    loop {
        select! {
            recv(command_rx) -> msg => match msg {
                Ok(Ok(Command::Submit(request))) => {
                    let _ = simulation.submit(request);
                },
                Ok(Ok(Command::Start)) => match simulation.start(status_tx.clone()) {
                    Ok(()) => info!("Starting elevator..."),
                    Err(SimulationError::AlreadyRunning) => warn!("Elevator is already running, new requests join the current run"),
                    Err(e) => return Err(e.into()),
                },
                Ok(Ok(Command::Status)) => {
                    println!("{}", serde_json::to_string(&simulation.elevator().status())?);
                },
                Ok(Ok(Command::Quit)) => {
                    info!("STOPPING PROGRAM...");
                    if let Some(Err(e)) = simulation.shutdown() {
                        return Err(e.into());
                    }
                    break;
                },
                Ok(Err(e)) => warn!("{}", e),
                // end of input: let a running elevator finish
                Err(_) => {
                    if let Some(Err(e)) = simulation.wait() {
                        return Err(e.into());
                    }
                    break;
                },
            },
            recv(done_rx) -> msg => {
                simulation.finish();
                match msg {
                    Ok(Ok(outcome)) => info!(?outcome, "Run finished, waiting for new requests"),
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => (),
                }
            },
        }
    }
    Ok(())
}
