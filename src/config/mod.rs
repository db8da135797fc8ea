//! Configuration types for Terra simulations.
//!
//! These types represent the simulation configuration document that is
//! edited in the store, saved to JSON and handed to the solver. Field names
//! follow the solver's wire format.

mod boundary;
mod document;
mod validate;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigFileError, ValidationError};

pub use boundary::BoundaryCondition;
pub use document::ConfigDocument;
pub use validate::{validate_count, validate_lid_velocity, validate_monitor, validate_positive, ConfigField};

/// Simulation box size [m].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelScale {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl ModelScale {
    pub fn max_extent(&self) -> f64 {
        self.length.max(self.width).max(self.height)
    }
}

/// Initial particle spacing per axis [m].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Resolution {
    pub fn min_spacing(&self) -> f64 {
        self.dx.min(self.dy).min(self.dz)
    }
}

/// Partial update of the SPH kernel parameters.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SphPatch {
    pub smooth_length: Option<f64>,
    pub cell_scale: Option<f64>,
    pub beta: Option<f64>,
    pub cs_rate: Option<f64>,
}

/// Partial update of the time stepping parameters.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeSteppingPatch {
    pub dt: Option<f64>,
    pub out_step: Option<usize>,
    pub max_step: Option<usize>,
}

fn default_out_file() -> PathBuf {
    PathBuf::from("sim_checkpoint.bin")
}

/// Complete simulation configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    /// Max particles
    pub max_n: usize,
    pub max_near_n: usize,

    pub model_scale: ModelScale,

    pub bc_pattern: BoundaryCondition,
    /// Lid velocity [m/s], only meaningful for lid-driven patterns.
    pub u_lid: f64,

    // SPH parameters
    pub smooth_length: f64,
    pub cell_scale: f64,
    pub beta: f64,
    pub cs_rate: f64,

    pub dx: Resolution,

    // Time stepping
    pub dt: f64,
    pub out_step: usize,
    pub max_step: usize,

    /// Checkpoint to restart from, also the snapshot drawn by "Draw Model".
    #[serde(default)]
    pub restart_file: Option<PathBuf>,
    /// Where the solver writes its final snapshot.
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,

    /// Index of the particle reported in telemetry samples.
    pub monitor_particle: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_n: 60_000,
            max_near_n: 100,
            model_scale: ModelScale {
                length: 0.5,
                width: 0.5,
                height: 0.5,
            },
            bc_pattern: BoundaryCondition::CavityFlow,
            u_lid: 5.0,
            smooth_length: 0.0324,
            cell_scale: 2.0,
            beta: 0.3,
            cs_rate: 0.05,
            dx: Resolution {
                dx: 0.027,
                dy: 0.027,
                dz: 0.027,
            },
            dt: 0.001,
            out_step: 10,
            max_step: 1000,
            restart_file: Some(PathBuf::from("sim_checkpoint.bin")),
            out_file: default_out_file(),
            monitor_particle: 10,
        }
    }
}

impl SimConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a complete configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&json).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric field; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_count(ConfigField::MaxN, self.max_n)?;
        validate_count(ConfigField::MaxNearN, self.max_near_n)?;
        validate_scale(&self.model_scale)?;
        validate_lid_velocity(self.u_lid)?;
        validate_positive(ConfigField::SmoothLength, self.smooth_length)?;
        validate_positive(ConfigField::CellScale, self.cell_scale)?;
        validate_positive(ConfigField::Beta, self.beta)?;
        validate_positive(ConfigField::CsRate, self.cs_rate)?;
        validate_resolution(&self.dx)?;
        validate_positive(ConfigField::Dt, self.dt)?;
        validate_count(ConfigField::OutStep, self.out_step)?;
        validate_count(ConfigField::MaxStep, self.max_step)?;
        validate_monitor(self.monitor_particle, self.max_n)?;
        Ok(())
    }

    /// Serialize into the document sent to the solver.
    pub fn to_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Snapshot path requested by "Draw Model", if any.
    pub fn restart_path(&self) -> Option<&Path> {
        self.restart_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

pub fn validate_scale(scale: &ModelScale) -> Result<(), ValidationError> {
    validate_positive(ConfigField::Length, scale.length)?;
    validate_positive(ConfigField::Width, scale.width)?;
    validate_positive(ConfigField::Height, scale.height)?;
    Ok(())
}

pub fn validate_resolution(dx: &Resolution) -> Result<(), ValidationError> {
    validate_positive(ConfigField::Dx, dx.dx)?;
    validate_positive(ConfigField::Dy, dx.dy)?;
    validate_positive(ConfigField::Dz, dx.dz)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidReason;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(SimConfig::default()).unwrap();
        assert_eq!(json["bc_pattern"], "Cavity-Flow");
        assert_eq!(json["model_scale"]["length"], 0.5);
        assert_eq!(json["dx"]["dz"], 0.027);
        assert_eq!(json["max_n"], 60_000);
        assert_eq!(json["restart_file"], "sim_checkpoint.bin");
    }

    #[test]
    fn test_rejects_nan_resolution() {
        let mut config = SimConfig::default();
        config.dx.dy = f64::NAN;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, ConfigField::Dy);
        assert_eq!(err.reason, InvalidReason::NotFinite);
    }

    #[test]
    fn test_rejects_monitor_outside_particles() {
        let config = SimConfig {
            max_n: 5,
            monitor_particle: 5,
            ..SimConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field, ConfigField::MonitorParticle);
    }

    #[test]
    fn test_empty_restart_path_is_none() {
        let config = SimConfig {
            restart_file: Some(PathBuf::new()),
            ..SimConfig::default()
        };
        assert!(config.restart_path().is_none());
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let config = SimConfig {
            bc_pattern: BoundaryCondition::PeriodicFlow,
            u_lid: 0.0,
            ..SimConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SimConfig::load(&path).unwrap(), config);
    }
}
