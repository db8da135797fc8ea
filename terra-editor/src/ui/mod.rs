//! UI panels for the editor

mod log_panel;
mod parameter_panel;
mod run_bar;

pub use log_panel::render_log_panel;
pub use parameter_panel::{FieldErrors, ParameterPanel};
pub use run_bar::{render_run_bar, RunCommand};
