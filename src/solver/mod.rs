//! The boundary to the numerical solver.
//!
//! The solver is opaque: it receives a configuration document, publishes log
//! events on the bus while it runs, and finishes with a completion signal.

mod process;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bus::{EventBus, SIMULATION_FINISHED};
use crate::error::{BusError, SolverError};

pub use process::ProcessSolver;

/// Identifies one run so a stale completion can be told apart.
pub type RunId = u64;

/// Everything a solver needs to start a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunTicket {
    pub id: RunId,
    /// Serialized configuration document.
    pub document: String,
    /// Where the solver is expected to write its final snapshot.
    pub out_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed(String),
}

/// Payload of the completion signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunFinished {
    pub run_id: RunId,
    pub status: RunStatus,
    /// Snapshot written by the run, when one exists.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

impl RunFinished {
    pub fn emit(&self, bus: &EventBus) -> Result<usize, BusError> {
        bus.emit(SIMULATION_FINISHED, self)
    }
}

/// Starts runs without waiting for them.
///
/// `run_simulation` returns once the run is handed off; progress and the
/// outcome arrive on the bus.
pub trait Solver {
    fn run_simulation(&mut self, ticket: RunTicket) -> Result<(), SolverError>;
}
