//! Log events published by the solver, and their display form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::PayloadError;

const RULE: &str = "------------------------------------------";

/// One event on the simulation log topic.
///
/// On the wire this is `{ "kind": ..., "data": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum LogEntry {
    RestartInfo {
        #[serde(default)]
        step: Option<usize>,
        time: f64,
        message: String,
    },
    #[serde(rename = "LogInfo")]
    Info(String),
    /// Periodic telemetry of the monitor particle.
    #[serde(rename = "Info3")]
    Sample {
        monitor_particle: usize,
        step: usize,
        time: f64,
        x: [f64; 3],
        v: [f64; 3],
        dvdt: [f64; 3],
    },
}

struct Vec3<'a>(&'a [f64; 3]);

impl fmt::Display for Vec3<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a:.3}, {b:.3}, {c:.3}")
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::RestartInfo {
                step,
                time,
                message,
            } => {
                f.write_str("[Restart] ")?;
                if let Some(step) = step {
                    write!(f, "step={step} ")?;
                }
                write!(f, "time={time:.6} {message}")
            }
            LogEntry::Info(text) => write!(f, "[Info] {text}"),
            LogEntry::Sample {
                monitor_particle,
                step,
                time,
                x,
                v,
                dvdt,
            } => {
                writeln!(f, "{RULE}")?;
                writeln!(f, "Step {step}, time = {:.3} [ms]", time * 1000.0)?;
                writeln!(f, "    Particle: {monitor_particle}")?;
                writeln!(f, "    (x, y, z) = {}", Vec3(x))?;
                writeln!(f, "    (vx, vy, vz) = {}", Vec3(v))?;
                writeln!(f, "    (ax, ay, az) = {}", Vec3(dvdt))?;
                f.write_str(RULE)
            }
        }
    }
}

/// Decode a raw payload and render it as a log line.
pub fn normalize(payload: &Value) -> Result<String, PayloadError> {
    let entry = LogEntry::deserialize(payload)?;
    Ok(entry.to_string())
}
