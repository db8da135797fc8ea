//! # Terra
//!
//! Operator-side core for a particle (SPH) simulation: configure a run,
//! preview the initial particle lattice in 3D, follow the solver's log while
//! it runs, and inspect the returned particle snapshot.
//!
//! The numerical solver is out of process. Terra talks to it through a
//! [`Solver`] and an [`EventBus`] carrying three topics: log events, stop
//! requests and completion signals.
//!
//! ## Quick Start
//!
//! ```ignore
//! use terra::prelude::*;
//!
//! let bus = EventBus::new();
//! let mut store = Store::new();
//! // Attach before anything can run: the bus does not replay.
//! let mut pipeline = LogPipeline::attach(&bus);
//! let mut controller = RunController::new(&bus);
//! let mut solver = ProcessSolver::new("terra-solver", bus.clone());
//!
//! store.try_dispatch(Action::SetULid(2.5))?;
//! controller.run(&mut store, &mut solver)?;
//!
//! loop {
//!     pipeline.pump(&mut store);
//!     if let Some(finished) = controller.poll(&mut store) {
//!         break;
//!     }
//! }
//! ```
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Configuration and runtime state, mutated by [`Action`]s through a pure reducer |
//! | [`pipeline`] | Turns log events into display lines in the store |
//! | [`lifecycle`] | Idle/Running state machine around the solver |
//! | [`viz`] | Scene derivation: preview lattice, result points, camera, reference grid |
//! | [`gpu`] | wgpu implementation of the scene backend |
//!
//! ## Event topics
//!
//! | Topic | Payload |
//! |-------|---------|
//! | [`bus::SIMULATION_LOG`] | [`LogEntry`] as `{ "kind", "data" }` |
//! | [`bus::SIMULATION_STOP`] | none |
//! | [`bus::SIMULATION_FINISHED`] | [`RunFinished`] |

pub mod bus;
pub mod config;
pub mod error;
pub mod gpu;
pub mod lifecycle;
pub mod particle_log;
pub mod pipeline;
pub mod snapshot;
pub mod solver;
pub mod store;
pub mod viz;

pub use bytemuck;
pub use glam;
pub use wgpu;

pub use bus::{EventBus, Subscription};
pub use config::{BoundaryCondition, ConfigDocument, ModelScale, Resolution, SimConfig, SphPatch, TimeSteppingPatch};
pub use error::{
    BusError, ConfigFileError, InvalidReason, PayloadError, RunError, SnapshotError, SolverError,
    ValidationError,
};
pub use lifecycle::{RunController, RunOutcome, RunPhase};
pub use particle_log::LogEntry;
pub use pipeline::LogPipeline;
pub use snapshot::{load_particle_state, Fluid, ParticleRecord, ResultSnapshot, SnapshotLoader};
pub use solver::{ProcessSolver, RunFinished, RunStatus, RunTicket, Solver};
pub use store::{Action, AppState, RuntimeState, Store};
pub use viz::{RenderMode, SceneBackend, SceneInputs, VisualizationEngine};

/// Everything an application embedding Terra usually needs.
pub mod prelude {
    pub use crate::bus::{EventBus, SIMULATION_FINISHED, SIMULATION_LOG, SIMULATION_STOP};
    pub use crate::config::{BoundaryCondition, ConfigDocument, ConfigField, SimConfig};
    pub use crate::lifecycle::{RunController, RunOutcome, RunPhase};
    pub use crate::pipeline::LogPipeline;
    pub use crate::snapshot::{load_particle_state, ResultSnapshot, SnapshotLoader};
    pub use crate::solver::{ProcessSolver, RunFinished, RunStatus, Solver};
    pub use crate::store::{Action, Store};
    pub use crate::viz::{SceneInputs, Surface, SurfaceSize, VisualizationEngine};
}
