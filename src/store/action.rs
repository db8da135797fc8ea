use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{
    validate_count, validate_lid_velocity, validate_monitor, validate_positive, validate_resolution,
    validate_scale, BoundaryCondition, ConfigDocument, ConfigField, ModelScale, Resolution,
    SimConfig, SphPatch, TimeSteppingPatch,
};
use crate::error::{InvalidReason, ValidationError};
use crate::snapshot::ResultSnapshot;

/// Every mutation the store accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetMaxN(usize),
    SetMaxNearN(usize),
    SetModelScale(ModelScale),
    /// Also zeroes the lid velocity for any pattern other than Cavity-Flow.
    SetBcPattern(BoundaryCondition),
    SetULid(f64),
    SetSphParams(SphPatch),
    SetResolution(Resolution),
    SetTimeStepping(TimeSteppingPatch),
    SetMonitorParticle(usize),
    SetRestartFile(Option<PathBuf>),
    SetOutFile(PathBuf),
    /// Merge an external document; runtime fields are left alone.
    LoadConfig(ConfigDocument),
    ResetToDefault,
    AppendLog(String),
    ClearLog,
    SetIsRunning(bool),
    SetSnapshot(Arc<ResultSnapshot>),
    ClearSnapshot,
}

impl Action {
    /// Check the values carried by this action against the current
    /// configuration. Actions without numeric payloads always pass.
    pub fn validate(&self, current: &SimConfig) -> Result<(), ValidationError> {
        match self {
            Action::SetMaxN(n) => {
                validate_count(ConfigField::MaxN, *n)?;
                // Lowering the limit must not strand the monitored particle.
                validate_monitor(current.monitor_particle, *n).map(drop)
            }
            Action::SetMaxNearN(n) => validate_count(ConfigField::MaxNearN, *n).map(drop),
            Action::SetModelScale(scale) => validate_scale(scale),
            Action::SetULid(u) => validate_lid_velocity(*u).map(drop),
            Action::SetSphParams(patch) => {
                let fields = [
                    (ConfigField::SmoothLength, patch.smooth_length),
                    (ConfigField::CellScale, patch.cell_scale),
                    (ConfigField::Beta, patch.beta),
                    (ConfigField::CsRate, patch.cs_rate),
                ];
                for (field, value) in fields {
                    if let Some(value) = value {
                        validate_positive(field, value)?;
                    }
                }
                Ok(())
            }
            Action::SetResolution(dx) => validate_resolution(dx),
            Action::SetTimeStepping(patch) => {
                if let Some(dt) = patch.dt {
                    validate_positive(ConfigField::Dt, dt)?;
                }
                if let Some(out_step) = patch.out_step {
                    validate_count(ConfigField::OutStep, out_step)?;
                }
                if let Some(max_step) = patch.max_step {
                    validate_count(ConfigField::MaxStep, max_step)?;
                }
                Ok(())
            }
            Action::SetMonitorParticle(index) => validate_monitor(*index, current.max_n).map(drop),
            Action::SetOutFile(path) if path.as_os_str().is_empty() => Err(ValidationError::new(
                ConfigField::OutFile,
                InvalidReason::Empty,
            )),
            Action::LoadConfig(doc) => doc.merge_into(current).validate(),
            Action::SetBcPattern(_)
            | Action::SetRestartFile(_)
            | Action::SetOutFile(_)
            | Action::ResetToDefault
            | Action::AppendLog(_)
            | Action::ClearLog
            | Action::SetIsRunning(_)
            | Action::SetSnapshot(_)
            | Action::ClearSnapshot => Ok(()),
        }
    }
}
