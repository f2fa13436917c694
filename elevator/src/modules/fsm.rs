/// ----- FSM MODULE -----
/// The controller owning the car's floor/direction state machine and the
/// sweep scheduling. Requests can be submitted from any clone of the
/// handle, also while another thread is inside `run`.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use shared_resources::config::ElevatorSettings;
use shared_resources::direction::Direction;
use shared_resources::error::{ConfigError, ControllerError, RequestError};
use shared_resources::request::{Floor, Request};
use shared_resources::status::StatusEvent;

use crate::modules::doors::{Clock, Pace};
use crate::utilities::debug::StatusSink;
use crate::utilities::elevator_status::{Behaviour, ElevatorStatus};
use crate::utilities::request_set::RequestSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both collections drained, the car is idle.
    Completed,
    /// Shutdown arrived between two units of movement. Pending requests
    /// are kept.
    Cancelled,
}

enum Step {
    Moved(StatusEvent),
    Stop(Floor),
}

#[derive(Clone)]
pub struct Elevator {
    settings: ElevatorSettings,
    car: Arc<Mutex<ElevatorStatus>>,
}

impl Elevator {
    pub fn new(settings: ElevatorSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let car = ElevatorStatus::new(settings.start_floor);
        Ok(Elevator {
            settings,
            car: Arc::new(Mutex::new(car)),
        })
    }

    pub fn settings(&self) -> &ElevatorSettings {
        &self.settings
    }

    pub fn status(&self) -> ElevatorStatus {
        self.car.lock().clone()
    }

    pub fn floor(&self) -> Floor {
        self.car.lock().floor
    }

    pub fn direction(&self) -> Direction {
        self.car.lock().direction
    }

    pub fn pending(&self) -> RequestSet {
        self.car.lock().requests.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.car.lock().requests.is_empty()
    }

    fn validate(&self, floor: Floor) -> Result<(), RequestError> {
        if self.settings.contains(floor) {
            Ok(())
        } else {
            Err(RequestError::InvalidFloor {
                floor,
                min: self.settings.min_floor,
                max: self.settings.max_floor,
            })
        }
    }

    /// Destination chosen inside the car. Queued for the sweep that moves
    /// the car towards it, as seen from where the car is right now.
    pub fn request_floor(&self, floor: Floor) -> Result<(), RequestError> {
        self.validate(floor)?;
        let mut car = self.car.lock();
        let direction = RequestSet::classify(car.floor, floor)?;
        if car.requests.add(direction, floor) {
            debug!("cab request for floor {} queued for {} sweep", floor, direction.as_string());
        }
        Ok(())
    }

    /// Hall call. The caller's direction decides the sweep, wherever the
    /// car currently is.
    pub fn request_from_outside(&self, floor: Floor, direction: Direction) -> Result<(), RequestError> {
        self.validate(floor)?;
        if direction == Direction::Idle {
            return Err(RequestError::MissingDirection(floor));
        }
        let mut car = self.car.lock();
        if car.requests.add(direction, floor) {
            debug!("hall call at floor {} queued for {} sweep", floor, direction.as_string());
        }
        Ok(())
    }

    pub fn submit(&self, request: Request) -> Result<(), RequestError> {
        match request.call.direction() {
            Some(direction) => self.request_from_outside(request.floor, direction),
            None => self.request_floor(request.floor),
        }
    }

    /// Serves requests until both collections are empty, then reports
    /// `Idle`. Upward sweeps win when the car is idle and both directions
    /// have work.
    pub fn run<C, S>(&self, clock: &mut C, sink: &mut S) -> Result<RunOutcome, ControllerError>
    where
        C: Clock + ?Sized,
        S: StatusSink + ?Sized,
    {
        info!("Elevator started at floor {}", self.floor());

        loop {
            let phase = {
                let mut car = self.car.lock();
                if car.requests.is_empty() {
                    car.direction = Direction::Idle;
                    car.behaviour = Behaviour::Idle;
                    break;
                }
                if car.direction == Direction::Idle {
                    car.direction = if car.requests.has_requests(Direction::Up) {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                }
                car.direction
            };

            let pace = match self.sweep(phase, clock, sink) {
                Ok(pace) => pace,
                Err(e) => {
                    let mut car = self.car.lock();
                    car.direction = Direction::Idle;
                    car.behaviour = Behaviour::Idle;
                    return Err(e);
                }
            };
            if pace == Pace::Cancelled {
                let mut car = self.car.lock();
                car.direction = Direction::Idle;
                car.behaviour = Behaviour::Idle;
                info!("Run cancelled at floor {}", car.floor);
                return Ok(RunOutcome::Cancelled);
            }

            let mut car = self.car.lock();
            car.direction = if car.requests.has_requests(phase.opposite()) {
                phase.opposite()
            } else {
                Direction::Idle
            };
        }

        let floor = self.floor();
        sink.notify(StatusEvent::Idle { floor });
        info!("All requests completed. Elevator is now idle at floor {}", floor);
        Ok(RunOutcome::Completed)
    }

    /// One pass in `direction`. The live collection is re-read after every
    /// unit of movement, so floors queued ahead of the car during the pass
    /// are served in it, while floors queued behind the car wait for the
    /// next pass. A pass whose floors all lie behind the car is preceded by
    /// an approach leg to the farthest of them.
    fn sweep<C, S>(&self, direction: Direction, clock: &mut C, sink: &mut S) -> Result<Pace, ControllerError>
    where
        C: Clock + ?Sized,
        S: StatusSink + ?Sized,
    {
        let approach = {
            let car = self.car.lock();
            match car.requests.nearest_ahead(direction, car.floor) {
                Some(_) => None,
                None => Some(car.requests.peek_nearest(direction)?),
            }
        };
        if let Some(target) = approach {
            if self.approach(target, direction.opposite(), clock, sink) == Pace::Cancelled {
                return Ok(Pace::Cancelled);
            }
        }

        self.car.lock().direction = direction;
        sink.notify(StatusEvent::SweepStarted { direction });
        debug!("Moving {}...", direction);

        loop {
            let step = {
                let mut car = self.car.lock();
                let Some(target) = car.requests.nearest_ahead(direction, car.floor) else {
                    return Ok(Pace::Elapsed);
                };
                if car.floor == target {
                    Step::Stop(target)
                } else {
                    car.floor += direction.step();
                    car.behaviour = Behaviour::Moving;
                    Step::Moved(StatusEvent::FloorChanged { floor: car.floor, direction })
                }
            };

            match step {
                Step::Moved(event) => {
                    if self.travelled(event, clock, sink) == Pace::Cancelled {
                        return Ok(Pace::Cancelled);
                    }
                }
                Step::Stop(floor) => {
                    if self.stop_at(floor, direction, clock, sink) == Pace::Cancelled {
                        return Ok(Pace::Cancelled);
                    }
                }
            }
        }
    }

    /// Moves the car to `target` in its own phase, heading `heading`,
    /// without serving any floor on the way.
    fn approach<C, S>(&self, target: Floor, heading: Direction, clock: &mut C, sink: &mut S) -> Pace
    where
        C: Clock + ?Sized,
        S: StatusSink + ?Sized,
    {
        self.car.lock().direction = heading;
        sink.notify(StatusEvent::SweepStarted { direction: heading });
        debug!("Moving {} to floor {}...", heading, target);

        loop {
            let event = {
                let mut car = self.car.lock();
                if car.floor == target {
                    return Pace::Elapsed;
                }
                car.floor += heading.step();
                car.behaviour = Behaviour::Moving;
                StatusEvent::FloorChanged { floor: car.floor, direction: heading }
            };
            if self.travelled(event, clock, sink) == Pace::Cancelled {
                return Pace::Cancelled;
            }
        }
    }

    fn travelled<C, S>(&self, event: StatusEvent, clock: &mut C, sink: &mut S) -> Pace
    where
        C: Clock + ?Sized,
        S: StatusSink + ?Sized,
    {
        debug!(?event, "moved");
        sink.notify(event);
        clock.wait(self.settings.per_floor_delay)
    }

    /// Door cycle at `floor`. The floor leaves its collection only after
    /// the doors have closed.
    fn stop_at<C, S>(&self, floor: Floor, direction: Direction, clock: &mut C, sink: &mut S) -> Pace
    where
        C: Clock + ?Sized,
        S: StatusSink + ?Sized,
    {
        self.car.lock().behaviour = Behaviour::DoorOpen;
        sink.notify(StatusEvent::DoorOpened { floor });
        let pace = clock.wait(self.settings.stop_delay);
        sink.notify(StatusEvent::DoorClosed { floor });

        let mut car = self.car.lock();
        car.requests.remove_served(floor, direction);
        car.behaviour = Behaviour::Moving;
        pace
    }
}

#[cfg(test)]
mod tests {
    use shared_resources::call::Call;
    use shared_resources::error::QueueError;

    use super::*;
    use crate::modules::doors::SimulatedClock;

    fn elevator(start_floor: Floor) -> Elevator {
        Elevator::new(ElevatorSettings::instant(1, 10).with_start_floor(start_floor)).unwrap()
    }

    fn run(elevator: &Elevator) -> Vec<StatusEvent> {
        let mut events: Vec<StatusEvent> = Vec::new();
        let outcome = elevator.run(&mut SimulatedClock::new(), &mut events).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        events
    }

    fn stops(events: &[StatusEvent]) -> Vec<Floor> {
        events
            .iter()
            .filter_map(|event| match event {
                StatusEvent::DoorOpened { floor } => Some(*floor),
                _ => None,
            })
            .collect()
    }

    fn sweeps(events: &[StatusEvent]) -> Vec<Direction> {
        events
            .iter()
            .filter_map(|event| match event {
                StatusEvent::SweepStarted { direction } => Some(*direction),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rejects_floors_outside_range() {
        let elevator = elevator(1);
        for floor in [0, -3, 11, 15] {
            assert_eq!(
                elevator.request_floor(floor),
                Err(RequestError::InvalidFloor { floor, min: 1, max: 10 })
            );
            assert!(matches!(
                elevator.request_from_outside(floor, Direction::Down),
                Err(RequestError::InvalidFloor { .. })
            ));
        }
        assert!(elevator.is_empty());
    }

    #[test]
    fn cab_requests_are_classified_by_current_floor() {
        let elevator = elevator(5);
        elevator.request_floor(8).unwrap();
        elevator.request_floor(2).unwrap();
        assert_eq!(elevator.request_floor(5), Err(RequestError::AlreadyAtFloor(5)));

        let pending = elevator.pending();
        assert_eq!(pending.up().collect::<Vec<_>>(), vec![8]);
        assert_eq!(pending.down().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn hall_calls_keep_their_direction() {
        let elevator = elevator(3);
        elevator.request_from_outside(8, Direction::Down).unwrap();
        elevator.submit(Request { floor: 1, call: Call::HallUp }).unwrap();
        assert_eq!(
            elevator.request_from_outside(4, Direction::Idle),
            Err(RequestError::MissingDirection(4))
        );

        let pending = elevator.pending();
        assert!(pending.contains(Direction::Down, 8));
        assert!(pending.contains(Direction::Up, 1));
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn same_floor_twice_is_one_entry() {
        let elevator = elevator(1);
        elevator.request_floor(6).unwrap();
        elevator.request_floor(6).unwrap();
        elevator.request_from_outside(6, Direction::Up).unwrap();
        assert_eq!(elevator.pending().len(), 1);
    }

    #[test]
    fn ascending_sweep_from_bottom() {
        let elevator = elevator(1);
        elevator.request_floor(5).unwrap();
        elevator.request_floor(3).unwrap();

        let events = run(&elevator);
        assert_eq!(stops(&events), vec![3, 5]);
        assert_eq!(sweeps(&events), vec![Direction::Up]);
        assert_eq!(events.last(), Some(&StatusEvent::Idle { floor: 5 }));
        assert_eq!(elevator.floor(), 5);
        assert_eq!(elevator.direction(), Direction::Idle);
        assert!(elevator.status().is_idle());
        assert!(elevator.is_empty());
    }

    #[test]
    fn up_sweep_wins_tie_break() {
        let elevator = elevator(5);
        elevator.request_from_outside(2, Direction::Down).unwrap();
        elevator.request_from_outside(8, Direction::Up).unwrap();

        let events = run(&elevator);
        assert_eq!(sweeps(&events), vec![Direction::Up, Direction::Down]);
        assert_eq!(stops(&events), vec![8, 2]);
        assert_eq!(elevator.floor(), 2);
    }

    #[test]
    fn request_for_current_floor_leaves_nothing_to_do() {
        let elevator = elevator(4);
        assert_eq!(elevator.request_floor(4), Err(RequestError::AlreadyAtFloor(4)));
        assert!(elevator.is_empty());

        let events = run(&elevator);
        assert_eq!(events, vec![StatusEvent::Idle { floor: 4 }]);
    }

    #[test]
    fn out_of_range_request_leaves_set_untouched() {
        let elevator = elevator(1);
        elevator.request_floor(7).unwrap();
        let before = elevator.pending();
        assert!(matches!(elevator.request_floor(15), Err(RequestError::InvalidFloor { floor: 15, .. })));
        assert_eq!(elevator.pending(), before);
    }

    /// Every floor change moves one floor in the direction of the phase it
    /// belongs to.
    fn assert_monotonic(start_floor: Floor, events: &[StatusEvent]) {
        let mut current = None;
        let mut last = start_floor;
        for event in events {
            match *event {
                StatusEvent::SweepStarted { direction } => current = Some(direction),
                StatusEvent::FloorChanged { floor, direction } => {
                    assert_eq!(Some(direction), current, "{:?} inside {:?} phase", event, current);
                    assert_eq!(floor, last + direction.step(), "{:?} after floor {}", event, last);
                    last = floor;
                }
                _ => {}
            }
        }
    }

    #[test]
    fn floor_events_are_monotonic_within_a_sweep() {
        let elevator = elevator(4);
        for floor in [9, 6, 7, 10] {
            elevator.request_floor(floor).unwrap();
        }
        for floor in [1, 3, 2] {
            elevator.request_floor(floor).unwrap();
        }

        let events = run(&elevator);
        assert_monotonic(4, &events);
        assert_eq!(stops(&events), vec![6, 7, 9, 10, 3, 2, 1]);
    }

    #[test]
    fn up_call_below_the_car_keeps_phases_monotonic() {
        let elevator = elevator(5);
        elevator.request_from_outside(2, Direction::Up).unwrap();
        elevator.request_from_outside(8, Direction::Up).unwrap();
        elevator.request_floor(3).unwrap();

        let events = run(&elevator);
        assert_monotonic(5, &events);
        assert_eq!(stops(&events), vec![8, 3, 2]);
        assert_eq!(
            sweeps(&events),
            vec![Direction::Up, Direction::Down, Direction::Down, Direction::Up]
        );
    }

    #[test]
    fn down_call_above_the_car_keeps_phases_monotonic() {
        let elevator = elevator(3);
        elevator.request_from_outside(9, Direction::Down).unwrap();
        elevator.request_floor(1).unwrap();

        let events = run(&elevator);
        assert_monotonic(3, &events);
        assert_eq!(stops(&events), vec![1, 9]);
        assert_eq!(
            sweeps(&events),
            vec![Direction::Down, Direction::Up, Direction::Down]
        );
        assert_eq!(elevator.floor(), 9);
    }

    #[test]
    fn every_stop_follows_arrival_and_precedes_close() {
        let elevator = elevator(1);
        elevator.request_floor(3).unwrap();
        let events = run(&elevator);
        assert_eq!(
            events,
            vec![
                StatusEvent::SweepStarted { direction: Direction::Up },
                StatusEvent::FloorChanged { floor: 2, direction: Direction::Up },
                StatusEvent::FloorChanged { floor: 3, direction: Direction::Up },
                StatusEvent::DoorOpened { floor: 3 },
                StatusEvent::DoorClosed { floor: 3 },
                StatusEvent::Idle { floor: 3 },
            ]
        );
    }

    #[test]
    fn hall_call_behind_the_car_is_approached_first() {
        let elevator = elevator(5);
        elevator.request_from_outside(2, Direction::Up).unwrap();

        let events = run(&elevator);
        assert_eq!(
            events,
            vec![
                StatusEvent::SweepStarted { direction: Direction::Down },
                StatusEvent::FloorChanged { floor: 4, direction: Direction::Down },
                StatusEvent::FloorChanged { floor: 3, direction: Direction::Down },
                StatusEvent::FloorChanged { floor: 2, direction: Direction::Down },
                StatusEvent::SweepStarted { direction: Direction::Up },
                StatusEvent::DoorOpened { floor: 2 },
                StatusEvent::DoorClosed { floor: 2 },
                StatusEvent::Idle { floor: 2 },
            ]
        );
        assert_eq!(elevator.floor(), 2);
    }

    #[test]
    fn floors_behind_the_car_wait_for_the_next_pass() {
        let elevator = elevator(5);
        elevator.request_from_outside(8, Direction::Up).unwrap();
        elevator.request_from_outside(2, Direction::Up).unwrap();

        let events = run(&elevator);
        // 8 is ahead, 2 is behind: served in a later up pass
        assert_eq!(stops(&events), vec![8, 2]);
        assert_eq!(sweeps(&events), vec![Direction::Up, Direction::Down, Direction::Up]);
        assert!(elevator.is_empty());
    }

    #[test]
    fn hall_call_at_car_floor_stops_without_moving() {
        let elevator = elevator(6);
        elevator.request_from_outside(6, Direction::Down).unwrap();
        let events = run(&elevator);
        assert_eq!(
            events,
            vec![
                StatusEvent::SweepStarted { direction: Direction::Down },
                StatusEvent::DoorOpened { floor: 6 },
                StatusEvent::DoorClosed { floor: 6 },
                StatusEvent::Idle { floor: 6 },
            ]
        );
    }

    /// Sink that submits a request the first time the car reaches a floor.
    struct LateRequest {
        elevator: Elevator,
        when_at: Floor,
        request: Request,
        submitted: bool,
        events: Vec<StatusEvent>,
    }

    impl StatusSink for LateRequest {
        fn notify(&mut self, event: StatusEvent) {
            if !self.submitted && matches!(event, StatusEvent::FloorChanged { floor, .. } if floor == self.when_at) {
                self.elevator.submit(self.request).unwrap();
                self.submitted = true;
            }
            self.events.push(event);
        }
    }

    #[test]
    fn late_request_ahead_joins_current_sweep() {
        let elevator = elevator(1);
        elevator.request_floor(8).unwrap();
        let mut sink = LateRequest {
            elevator: elevator.clone(),
            when_at: 3,
            request: Request::cab(5),
            submitted: false,
            events: Vec::new(),
        };
        elevator.run(&mut SimulatedClock::new(), &mut sink).unwrap();
        assert_eq!(stops(&sink.events), vec![5, 8]);
        assert_eq!(sweeps(&sink.events), vec![Direction::Up]);
    }

    #[test]
    fn late_request_behind_is_deferred() {
        let elevator = elevator(1);
        elevator.request_floor(8).unwrap();
        let mut sink = LateRequest {
            elevator: elevator.clone(),
            when_at: 6,
            request: Request::hall(4, Direction::Up).unwrap(),
            submitted: false,
            events: Vec::new(),
        };
        elevator.run(&mut SimulatedClock::new(), &mut sink).unwrap();
        assert_eq!(stops(&sink.events), vec![8, 4]);
        assert_eq!(sweeps(&sink.events), vec![Direction::Up, Direction::Down, Direction::Up]);
        assert_monotonic(1, &sink.events);
        assert!(elevator.is_empty());
    }

    #[test]
    fn cancellation_stops_between_floors_and_keeps_requests() {
        let elevator = elevator(1);
        elevator.request_floor(6).unwrap();
        let mut events: Vec<StatusEvent> = Vec::new();
        let outcome = elevator.run(&mut SimulatedClock::cancel_after(2), &mut events).unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(elevator.floor(), 4);
        assert_eq!(elevator.direction(), Direction::Idle);
        assert!(elevator.pending().contains(Direction::Up, 6));
        assert!(!events.iter().any(|event| matches!(event, StatusEvent::Idle { .. })));
    }

    #[test]
    fn cancellation_during_approach_leaves_car_idle() {
        let elevator = elevator(8);
        elevator.request_from_outside(3, Direction::Up).unwrap();
        let mut events: Vec<StatusEvent> = Vec::new();
        let outcome = elevator.run(&mut SimulatedClock::cancel_after(1), &mut events).unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(elevator.floor(), 6);
        assert_eq!(elevator.direction(), Direction::Idle);
        assert_eq!(sweeps(&events), vec![Direction::Down]);
        assert!(elevator.pending().contains(Direction::Up, 3));
    }

    #[test]
    fn sweep_over_empty_collection_is_an_invariant_violation() {
        let elevator = elevator(5);
        let mut events: Vec<StatusEvent> = Vec::new();
        let result = elevator.sweep(Direction::Up, &mut SimulatedClock::new(), &mut events);
        assert_eq!(result, Err(ControllerError::Invariant(QueueError::Empty(Direction::Up))));
        assert!(events.is_empty());
        assert_eq!(elevator.floor(), 5);
        assert_eq!(elevator.direction(), Direction::Idle);
    }

    #[test]
    fn pacing_uses_configured_delays() {
        let settings = ElevatorSettings {
            per_floor_delay: std::time::Duration::from_secs(2),
            stop_delay: std::time::Duration::from_secs(3),
            ..ElevatorSettings::default()
        };
        let elevator = Elevator::new(settings).unwrap();
        elevator.request_floor(4).unwrap();
        let mut clock = SimulatedClock::new();
        elevator.run(&mut clock, &mut Vec::<StatusEvent>::new()).unwrap();
        assert_eq!(clock.elapsed(), std::time::Duration::from_secs(3 * 2 + 3));
    }

    #[test]
    fn invalid_start_floor_is_rejected() {
        let settings = ElevatorSettings::instant(1, 10).with_start_floor(12);
        assert!(matches!(Elevator::new(settings), Err(ConfigError::Invalid(_))));
    }
}
