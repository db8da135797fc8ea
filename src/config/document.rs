//! Externally loaded configuration documents.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{BoundaryCondition, ModelScale, Resolution, SimConfig};
use crate::error::ConfigFileError;

/// A configuration document where every field may be missing.
///
/// Merging a document only overwrites the fields it carries. Runtime state
/// (log, run flag, snapshot) has no representation here, so a load can never
/// touch it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigDocument {
    pub max_n: Option<usize>,
    pub max_near_n: Option<usize>,
    pub model_scale: Option<ModelScale>,
    pub bc_pattern: Option<BoundaryCondition>,
    pub u_lid: Option<f64>,
    pub smooth_length: Option<f64>,
    pub cell_scale: Option<f64>,
    pub beta: Option<f64>,
    pub cs_rate: Option<f64>,
    pub dx: Option<Resolution>,
    pub dt: Option<f64>,
    pub out_step: Option<usize>,
    pub max_step: Option<usize>,
    pub restart_file: Option<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub monitor_particle: Option<usize>,
}

impl ConfigDocument {
    /// Read a (possibly partial) document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply this document over `base`, field by field.
    pub fn merge_into(&self, base: &SimConfig) -> SimConfig {
        let doc = self.clone();
        SimConfig {
            max_n: doc.max_n.unwrap_or(base.max_n),
            max_near_n: doc.max_near_n.unwrap_or(base.max_near_n),
            model_scale: doc.model_scale.unwrap_or(base.model_scale),
            bc_pattern: doc.bc_pattern.unwrap_or(base.bc_pattern),
            u_lid: doc.u_lid.unwrap_or(base.u_lid),
            smooth_length: doc.smooth_length.unwrap_or(base.smooth_length),
            cell_scale: doc.cell_scale.unwrap_or(base.cell_scale),
            beta: doc.beta.unwrap_or(base.beta),
            cs_rate: doc.cs_rate.unwrap_or(base.cs_rate),
            dx: doc.dx.unwrap_or(base.dx),
            dt: doc.dt.unwrap_or(base.dt),
            out_step: doc.out_step.unwrap_or(base.out_step),
            max_step: doc.max_step.unwrap_or(base.max_step),
            restart_file: doc.restart_file.or_else(|| base.restart_file.clone()),
            out_file: doc.out_file.unwrap_or_else(|| base.out_file.clone()),
            monitor_particle: doc.monitor_particle.unwrap_or(base.monitor_particle),
        }
    }
}

impl From<SimConfig> for ConfigDocument {
    fn from(config: SimConfig) -> Self {
        Self {
            max_n: Some(config.max_n),
            max_near_n: Some(config.max_near_n),
            model_scale: Some(config.model_scale),
            bc_pattern: Some(config.bc_pattern),
            u_lid: Some(config.u_lid),
            smooth_length: Some(config.smooth_length),
            cell_scale: Some(config.cell_scale),
            beta: Some(config.beta),
            cs_rate: Some(config.cs_rate),
            dx: Some(config.dx),
            dt: Some(config.dt),
            out_step: Some(config.out_step),
            max_step: Some(config.max_step),
            restart_file: config.restart_file,
            out_file: Some(config.out_file),
            monitor_particle: Some(config.monitor_particle),
        }
    }
}
