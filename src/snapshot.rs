//! Particle state snapshots returned by the solver.
//!
//! A snapshot is replaced wholesale on every load; nothing mutates one in
//! place. Files ending in `.json` are read as JSON, anything else as the
//! solver's binary encoding.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::SnapshotError;

/// Fluid kind carried by each particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fluid {
    Water,
    Air,
}

/// Physical state of a single particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Location [m]
    #[serde(rename = "x")]
    pub position: [f64; 3],
    /// Velocity [m/s]
    #[serde(rename = "v")]
    pub velocity: [f64; 3],
    /// Cauchy stress [Pa]
    pub stress: [[f64; 3]; 3],
    /// Density [kg/m^3]
    #[serde(rename = "rho")]
    pub density: f64,
    /// Total energy [J]
    #[serde(rename = "e")]
    pub energy: f64,
    /// Temperature [K]
    pub temperature: f64,
    pub fluid: Fluid,
}

impl ParticleRecord {
    pub fn speed(&self) -> f64 {
        let [vx, vy, vz] = self.velocity;
        (vx * vx + vy * vy + vz * vz).sqrt()
    }
}

/// Particle records captured at one solver step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub particles: Vec<ParticleRecord>,
    pub step: usize,
    pub time: f64,
}

impl ResultSnapshot {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Write the snapshot using the encoding implied by the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            serde_json::to_vec(self).map_err(|source| SnapshotError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            bincode::serialize(self).map_err(|source| SnapshotError::Binary {
                path: path.to_path_buf(),
                source,
            })?
        };
        std::fs::write(path, bytes).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a previously saved result for visualization.
pub fn load_particle_state(path: impl AsRef<Path>) -> Result<ResultSnapshot, SnapshotError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(SnapshotError::MissingPath);
    }
    let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = if is_json(path) {
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        bincode::deserialize(&bytes).map_err(|source| SnapshotError::Binary {
            path: path.to_path_buf(),
            source,
        })?
    };
    Ok(snapshot)
}

/// Result of a background load, tagged with the path that was requested.
pub type LoadResult = (PathBuf, Result<ResultSnapshot, SnapshotError>);

/// Loads snapshots off the UI thread so the frame loop never blocks on disk.
pub struct SnapshotLoader {
    tx: Sender<PathBuf>,
    rx: Receiver<LoadResult>,
}

impl SnapshotLoader {
    /// Spawn the background loader thread.
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<PathBuf>();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded::<LoadResult>();

        thread::spawn(move || {
            while let Ok(path) = req_rx.recv() {
                let result = load_particle_state(&path);
                if resp_tx.send((path, result)).is_err() {
                    break;
                }
            }
        });

        Self {
            tx: req_tx,
            rx: resp_rx,
        }
    }

    /// Queue a load (non-blocking).
    pub fn request(&self, path: impl Into<PathBuf>) -> Result<(), SnapshotError> {
        self.tx.send(path.into()).map_err(|_| SnapshotError::LoaderGone)
    }

    /// Try to receive a finished load (non-blocking).
    pub fn try_recv(&self) -> Option<LoadResult> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished load.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LoadResult> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
pub(crate) fn sample_snapshot(speeds: &[f64]) -> ResultSnapshot {
    let particles = speeds
        .iter()
        .enumerate()
        .map(|(i, &speed)| ParticleRecord {
            position: [i as f64 * 0.1, 0.0, 0.0],
            velocity: [speed, 0.0, 0.0],
            stress: [[0.0; 3]; 3],
            density: 1000.0,
            energy: 0.0,
            temperature: 293.15,
            fluid: Fluid::Water,
        })
        .collect();
    ResultSnapshot {
        particles,
        step: 100,
        time: 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_binary_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = sample_snapshot(&[0.0, 1.0, 2.5]);

        for name in ["state.bin", "state.json"] {
            let path = dir.path().join(name);
            snapshot.save(&path).unwrap();
            assert_eq!(load_particle_state(&path).unwrap(), snapshot);
        }
    }

    #[test]
    fn test_reads_solver_field_names() {
        let json = r#"{
            "particles": [{
                "pair": 4, "volume": 1e-6, "rho0": 1000.0, "rho": 998.0,
                "viscosity": 0.001, "sound_v": 1482.0,
                "x": [0.1, 0.2, 0.3], "v": [3.0, 4.0, 0.0],
                "stress": [[0,0,0],[0,0,0],[0,0,0]], "dvdt": [0,0,0],
                "e": 1.5, "dedt": 0.0, "temperature": 293.15, "fluid": "Water"
            }],
            "step": 20,
            "time": 0.02
        }"#;
        let snapshot: ResultSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.particles[0].speed(), 5.0);
        assert_eq!(snapshot.particles[0].density, 998.0);
    }

    #[test]
    fn test_missing_path() {
        assert!(matches!(
            load_particle_state(""),
            Err(SnapshotError::MissingPath)
        ));
    }

    #[test]
    fn test_loader_reports_errors() {
        let loader = SnapshotLoader::spawn();
        loader.request("does/not/exist.bin").unwrap();
        let (path, result) = loader.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(path, PathBuf::from("does/not/exist.bin"));
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }
}
