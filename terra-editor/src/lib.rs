//! Terra Editor - desktop front end for Terra particle simulations
//!
//! This crate provides:
//! - Logging and command-line setup shared by both binaries
//! - An embedded 3D viewport driven by the core visualization engine
//! - Parameter, log and run-control panels
//! - A headless runner that streams solver output to the terminal

pub mod logging;
pub mod settings;
#[cfg(feature = "egui")]
pub mod embedded;
#[cfg(feature = "egui")]
pub mod ui;

pub use settings::SolverSettings;
#[cfg(feature = "egui")]
pub use embedded::{EmbeddedViewport, ViewportCallback, ViewportResources};
