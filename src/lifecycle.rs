//! Run/stop orchestration.
//!
//! [`RunController`] is a two-state machine that hands the current
//! configuration to a [`Solver`] and keeps the store's run flag in step with
//! it.
//!
//! | From    | Event                    | To      | Effect                                   |
//! |---------|--------------------------|---------|------------------------------------------|
//! | Idle    | `run`                    | Running | document sent to solver, flag set        |
//! | Running | `run`                    | Running | ignored                                  |
//! | Running | `stop`                   | Idle    | stop event emitted, flag cleared         |
//! | Running | completion for this run  | Idle    | flag cleared, completion returned        |
//! | Running | solver call fails        | Idle    | flag cleared, error returned             |
//!
//! Stop does not wait for the solver. Completions carry the run id, so the
//! signal from a run that was stopped earlier cannot end a newer one.
//!
//! ```ignore
//! let mut controller = RunController::new(&bus);
//! controller.run(&mut store, &mut solver)?;
//! // every frame:
//! if let Some(finished) = controller.poll(&mut store) { /* load snapshot */ }
//! ```

use crate::bus::{EventBus, Subscription, SIMULATION_FINISHED, SIMULATION_STOP};
use crate::error::RunError;
use crate::solver::{RunFinished, RunId, RunTicket, Solver};
use crate::store::{Action, Store};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
}

/// What a `run` request did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Started(RunId),
    /// A run was already in flight; nothing happened.
    AlreadyRunning,
}

#[derive(Debug)]
pub struct RunController {
    phase: RunPhase,
    bus: EventBus,
    finished: Subscription,
    current: Option<RunId>,
    next_id: RunId,
}

impl RunController {
    /// Create an idle controller listening for completion signals on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        Self {
            phase: RunPhase::Idle,
            bus: bus.clone(),
            finished: bus.subscribe(SIMULATION_FINISHED),
            current: None,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current
    }

    pub fn run(&mut self, store: &mut Store, solver: &mut dyn Solver) -> Result<RunOutcome, RunError> {
        if self.phase == RunPhase::Running {
            log::debug!("Run ignored: run {:?} still active", self.current);
            return Ok(RunOutcome::AlreadyRunning);
        }

        let config = store.config();
        config.validate()?;
        let ticket = RunTicket {
            id: self.next_id,
            document: config.to_document()?,
            out_file: config.out_file.clone(),
        };
        self.next_id += 1;

        let id = ticket.id;
        self.enter_running(store, id);

        if let Err(err) = solver.run_simulation(ticket) {
            log::error!("Run {id} failed to start: {err}");
            self.enter_idle(store);
            return Err(err.into());
        }

        log::info!("Run {id} started");
        Ok(RunOutcome::Started(id))
    }

    /// Request cancellation and go idle immediately.
    pub fn stop(&mut self, store: &mut Store) -> Result<(), RunError> {
        if self.phase == RunPhase::Idle {
            return Ok(());
        }
        let id = self.current;
        self.enter_idle(store);
        let notified = self.bus.emit(SIMULATION_STOP, &())?;
        log::info!("Stop requested for run {id:?} ({notified} listener(s))");
        Ok(())
    }

    /// Consume queued completion signals.
    ///
    /// Returns the completion of the active run if it arrived. Signals for
    /// other runs are discarded.
    pub fn poll(&mut self, store: &mut Store) -> Option<RunFinished> {
        let mut result = None;
        for value in self.finished.drain() {
            let finished: RunFinished = match serde_json::from_value(value) {
                Ok(finished) => finished,
                Err(err) => {
                    log::warn!("Ignoring malformed completion signal: {err}");
                    continue;
                }
            };
            if self.phase == RunPhase::Running && self.current == Some(finished.run_id) {
                log::info!("Run {} completed: {:?}", finished.run_id, finished.status);
                self.enter_idle(store);
                result = Some(finished);
            } else {
                log::debug!("Discarding completion of stale run {}", finished.run_id);
            }
        }
        result
    }

    fn enter_running(&mut self, store: &mut Store, id: RunId) {
        self.phase = RunPhase::Running;
        self.current = Some(id);
        store.dispatch(Action::SetIsRunning(true));
    }

    fn enter_idle(&mut self, store: &mut Store) {
        self.phase = RunPhase::Idle;
        self.current = None;
        store.dispatch(Action::SetIsRunning(false));
    }
}
