use super::{Action, AppState, RuntimeState};
use crate::config::SimConfig;

/// Apply one action to the state.
///
/// Pure: no logging, no I/O. Values are assumed valid; callers that accept
/// user input go through [`super::Store::try_dispatch`].
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    let config = &mut state.config;
    match action {
        Action::SetMaxN(n) => config.max_n = n,
        Action::SetMaxNearN(n) => config.max_near_n = n,
        Action::SetModelScale(scale) => config.model_scale = scale,
        Action::SetBcPattern(pattern) => {
            config.bc_pattern = pattern;
            if !pattern.is_lid_driven() {
                config.u_lid = 0.0;
            }
        }
        Action::SetULid(u) => config.u_lid = u,
        Action::SetSphParams(patch) => {
            if let Some(v) = patch.smooth_length {
                config.smooth_length = v;
            }
            if let Some(v) = patch.cell_scale {
                config.cell_scale = v;
            }
            if let Some(v) = patch.beta {
                config.beta = v;
            }
            if let Some(v) = patch.cs_rate {
                config.cs_rate = v;
            }
        }
        Action::SetResolution(dx) => config.dx = dx,
        Action::SetTimeStepping(patch) => {
            if let Some(v) = patch.dt {
                config.dt = v;
            }
            if let Some(v) = patch.out_step {
                config.out_step = v;
            }
            if let Some(v) = patch.max_step {
                config.max_step = v;
            }
        }
        Action::SetMonitorParticle(index) => config.monitor_particle = index,
        Action::SetRestartFile(path) => {
            config.restart_file = path.filter(|p| !p.as_os_str().is_empty());
        }
        Action::SetOutFile(path) => config.out_file = path,
        Action::LoadConfig(doc) => *config = doc.merge_into(config),
        Action::ResetToDefault => {
            // The run flag belongs to the controller, not to the document.
            let is_running = state.runtime.is_running;
            return AppState {
                config: SimConfig::default(),
                runtime: RuntimeState {
                    is_running,
                    ..RuntimeState::default()
                },
            };
        }
        Action::AppendLog(line) => state.runtime.log.push(line),
        Action::ClearLog => state.runtime.log.clear(),
        Action::SetIsRunning(running) => state.runtime.is_running = running,
        Action::SetSnapshot(snapshot) => state.runtime.snapshot = Some(snapshot),
        Action::ClearSnapshot => state.runtime.snapshot = None,
    }
    state
}
