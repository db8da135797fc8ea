//! Command-line and environment settings.

use clap::Args;
use std::path::{Path, PathBuf};
use terra::{ConfigDocument, ConfigFileError, EventBus, ProcessSolver, SimConfig};

/// Options shared by the editor and the runner.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct SolverSettings {
    /// Solver executable, fed the configuration document on stdin.
    #[arg(long, env = "TERRA_SOLVER", default_value = "terra-solver")]
    pub solver: PathBuf,

    /// Extra arguments passed to the solver.
    #[arg(long = "solver-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub solver_args: Vec<String>,

    /// Log level (error, warn, info, debug, trace). Falls back to RUST_LOG.
    #[arg(long, env = "TERRA_LOG")]
    pub log_level: Option<String>,
}

impl SolverSettings {
    pub fn solver(&self, bus: &EventBus) -> ProcessSolver {
        ProcessSolver::new(&self.solver, bus.clone()).with_args(self.solver_args.iter().cloned())
    }
}

/// Read a (possibly partial) configuration file over the defaults.
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigFileError> {
    let config = ConfigDocument::load(path)?.merge_into(&SimConfig::default());
    config.validate()?;
    Ok(config)
}
