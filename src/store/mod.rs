//! The configuration and runtime store.
//!
//! One [`Store`] is constructed by the owning application and handed by
//! reference to every consumer. All mutation goes through [`Action`]s applied
//! by the pure [`reduce`] function.

mod action;
mod reducer;

use std::sync::Arc;

use crate::config::SimConfig;
use crate::error::ValidationError;
use crate::snapshot::ResultSnapshot;

pub use action::Action;
pub use reducer::reduce;

/// Fields that exist only while the tool is running; never saved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeState {
    /// Normalized log lines in arrival order.
    pub log: Vec<String>,
    pub is_running: bool,
    pub snapshot: Option<Arc<ResultSnapshot>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub config: SimConfig,
    pub runtime: RuntimeState,
}

#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            state: AppState {
                config,
                runtime: RuntimeState::default(),
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.state.config
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.state.runtime
    }

    /// Apply an action without validation.
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Validate, then apply. A rejected action leaves the state untouched.
    pub fn try_dispatch(&mut self, action: Action) -> Result<(), ValidationError> {
        action.validate(&self.state.config)?;
        self.dispatch(action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigField, TimeSteppingPatch};

    #[test]
    fn test_rejected_action_leaves_state_unchanged() {
        let mut store = Store::new();
        let before = store.state().clone();

        let err = store
            .try_dispatch(Action::SetTimeStepping(TimeSteppingPatch {
                dt: Some(0.0),
                ..TimeSteppingPatch::default()
            }))
            .unwrap_err();

        assert_eq!(err.field, ConfigField::Dt);
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_with_config_starts_with_empty_runtime() {
        let config = SimConfig {
            max_n: 42,
            monitor_particle: 0,
            ..SimConfig::default()
        };
        let store = Store::with_config(config.clone());
        assert_eq!(store.config(), &config);
        assert_eq!(store.runtime(), &RuntimeState::default());
    }
}
