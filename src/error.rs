//! Error types for Terra.
//!
//! Every fallible operation in the crate returns one of these. Validation
//! errors are field-scoped so an editor can render them next to the input
//! that produced them.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigField;

/// Why a configuration value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// NaN or infinite.
    NotFinite,
    /// Zero or negative where a strictly positive value is required.
    NotPositive,
    /// Negative where zero is allowed.
    Negative,
    /// Index outside the particle range.
    OutOfRange,
    /// Empty path.
    Empty,
}

/// A configuration value that must not enter the store.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {}", describe(.reason))]
pub struct ValidationError {
    pub field: ConfigField,
    pub reason: InvalidReason,
}

fn describe(reason: &InvalidReason) -> &'static str {
    match reason {
        InvalidReason::NotFinite => "must be a finite number",
        InvalidReason::NotPositive => "must be greater than zero",
        InvalidReason::Negative => "must not be negative",
        InvalidReason::OutOfRange => "must be smaller than the particle limit",
        InvalidReason::Empty => "must not be empty",
    }
}

impl ValidationError {
    pub fn new(field: ConfigField, reason: InvalidReason) -> Self {
        Self { field, reason }
    }
}

/// Errors while saving or loading configuration documents.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Errors raised while publishing on the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to encode payload for {topic}: {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A log payload that does not match any known entry kind.
#[derive(Debug, Error)]
#[error("unrecognized log payload: {source}")]
pub struct PayloadError {
    #[from]
    source: serde_json::Error,
}

/// Errors while loading a particle snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot path given")]
    MissingPath,
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode JSON snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode binary snapshot {path}: {source}")]
    Binary {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("snapshot loader is no longer running")]
    LoaderGone,
}

/// Errors while handing a run to the solver.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to start solver `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send configuration to the solver: {0}")]
    Io(#[from] std::io::Error),
    #[error("solver rejected the configuration: {0}")]
    Rejected(String),
}

/// Errors surfaced by the run/stop controller.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration is invalid: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Bus(#[from] BusError),
}
