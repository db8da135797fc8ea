//! Field-level validation.
//!
//! Values are checked before they are dispatched; the store itself never
//! sees a non-finite or non-positive number.

use crate::error::{InvalidReason, ValidationError};

/// Names every editable configuration field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigField {
    MaxN,
    MaxNearN,
    Length,
    Width,
    Height,
    ULid,
    SmoothLength,
    CellScale,
    Beta,
    CsRate,
    Dx,
    Dy,
    Dz,
    Dt,
    OutStep,
    MaxStep,
    RestartFile,
    OutFile,
    MonitorParticle,
}

impl ConfigField {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigField::MaxN => "Max particles",
            ConfigField::MaxNearN => "Max near particles",
            ConfigField::Length => "Size X",
            ConfigField::Width => "Size Y",
            ConfigField::Height => "Size Z",
            ConfigField::ULid => "U_lid",
            ConfigField::SmoothLength => "Smooth length",
            ConfigField::CellScale => "Cell scale",
            ConfigField::Beta => "Beta",
            ConfigField::CsRate => "CS rate",
            ConfigField::Dx => "DX",
            ConfigField::Dy => "DY",
            ConfigField::Dz => "DZ",
            ConfigField::Dt => "Dt",
            ConfigField::OutStep => "Output step",
            ConfigField::MaxStep => "Max step",
            ConfigField::RestartFile => "Restart file",
            ConfigField::OutFile => "Output file",
            ConfigField::MonitorParticle => "Monitor particle",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Finite and strictly positive.
pub fn validate_positive(field: ConfigField, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        Err(ValidationError::new(field, InvalidReason::NotFinite))
    } else if value <= 0.0 {
        Err(ValidationError::new(field, InvalidReason::NotPositive))
    } else {
        Ok(value)
    }
}

pub fn validate_count(field: ConfigField, value: usize) -> Result<usize, ValidationError> {
    if value == 0 {
        Err(ValidationError::new(field, InvalidReason::NotPositive))
    } else {
        Ok(value)
    }
}

/// The lid velocity is the one numeric field allowed to be zero: switching to
/// a non-lid-driven pattern forces it there.
pub fn validate_lid_velocity(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        Err(ValidationError::new(ConfigField::ULid, InvalidReason::NotFinite))
    } else if value < 0.0 {
        Err(ValidationError::new(ConfigField::ULid, InvalidReason::Negative))
    } else {
        Ok(value)
    }
}

pub fn validate_monitor(index: usize, max_n: usize) -> Result<usize, ValidationError> {
    if index >= max_n {
        Err(ValidationError::new(
            ConfigField::MonitorParticle,
            InvalidReason::OutOfRange,
        ))
    } else {
        Ok(index)
    }
}
