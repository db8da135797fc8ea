//! Runs an external solver executable.
//!
//! The configuration document is written to the child's stdin. Each stdout
//! line is expected to be a JSON log event (`{"kind": .., "data": ..}`); any
//! other line is forwarded as plain info text. A stop event kills the child.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, SystemTime};

use super::{RunFinished, RunStatus, RunTicket, Solver};
use crate::bus::{EventBus, Subscription, SIMULATION_LOG, SIMULATION_STOP};
use crate::error::SolverError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct ProcessSolver {
    command: PathBuf,
    args: Vec<String>,
    bus: EventBus,
}

impl ProcessSolver {
    pub fn new(command: impl Into<PathBuf>, bus: EventBus) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            bus,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn command(&self) -> &std::path::Path {
        &self.command
    }
}

impl Solver for ProcessSolver {
    fn run_simulation(&mut self, ticket: RunTicket) -> Result<(), SolverError> {
        // Subscribe before spawning so an immediate stop is not missed.
        let stop = self.bus.subscribe(SIMULATION_STOP);
        // A snapshot left by an earlier run must not be reported as this one's.
        let previous_output = modified_at(&ticket.out_file);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                command: self.command.display().to_string(),
                source,
            })?;
        log::info!(
            "Started solver {} (run {}, pid {})",
            self.command.display(),
            ticket.id,
            child.id()
        );

        if let Err(err) = write_document(&mut child, &ticket.document) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err);
        }

        let reader = child.stdout.take().map(|stdout| {
            let bus = self.bus.clone();
            thread::spawn(move || forward_stdout(stdout, &bus))
        });

        let bus = self.bus.clone();
        thread::spawn(move || {
            let status = supervise(child, &stop);
            // A killed solver may leave grandchildren holding stdout open.
            if status != RunStatus::Cancelled {
                if let Some(reader) = reader {
                    let _ = reader.join();
                }
            }
            let snapshot = match status {
                RunStatus::Completed if written_since(&ticket.out_file, previous_output) => {
                    Some(ticket.out_file)
                }
                RunStatus::Completed => {
                    log::warn!(
                        "Run {} completed without writing {}",
                        ticket.id,
                        ticket.out_file.display()
                    );
                    None
                }
                _ => None,
            };
            let finished = RunFinished {
                run_id: ticket.id,
                status,
                snapshot,
            };
            log::info!("Run {} finished: {:?}", finished.run_id, finished.status);
            if let Err(err) = finished.emit(&bus) {
                log::error!("Failed to publish completion of run {}: {err}", finished.run_id);
            }
        });

        Ok(())
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// The file exists and its modification time moved since `before`.
fn written_since(path: &Path, before: Option<SystemTime>) -> bool {
    path.is_file()
        && match (before, modified_at(path)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(before), Some(now)) => now != before,
        }
}

fn write_document(child: &mut Child, document: &str) -> Result<(), SolverError> {
    let Some(mut stdin) = child.stdin.take() else {
        return Err(SolverError::Rejected("solver stdin is not available".into()));
    };
    stdin.write_all(document.as_bytes())?;
    stdin.write_all(b"\n")?;
    // Dropping stdin closes the pipe so the solver sees EOF.
    Ok(())
}

fn forward_stdout(stdout: ChildStdout, bus: &EventBus) {
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("Solver output unreadable: {err}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let payload = serde_json::from_str::<Value>(trimmed)
            .unwrap_or_else(|_| json!({ "kind": "LogInfo", "data": trimmed }));
        if let Err(err) = bus.emit(SIMULATION_LOG, &payload) {
            log::warn!("Failed to forward solver output: {err}");
        }
    }
}

/// Wait for the child to exit, killing it if a stop event arrives first.
fn supervise(mut child: Child, stop: &Subscription) -> RunStatus {
    loop {
        if stop.recv_timeout(POLL_INTERVAL).is_some() {
            log::info!("Stop requested, killing solver (pid {})", child.id());
            let _ = child.kill();
            let _ = child.wait();
            return RunStatus::Cancelled;
        }
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return RunStatus::Completed,
            Ok(Some(status)) => return RunStatus::Failed(format!("solver exited with {status}")),
            Ok(None) => {}
            Err(err) => return RunStatus::Failed(err.to_string()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bus::SIMULATION_FINISHED;

    fn wait_finished(sub: &Subscription) -> RunFinished {
        let value = sub
            .recv_timeout(Duration::from_secs(10))
            .expect("run did not finish");
        serde_json::from_value(value).unwrap()
    }

    fn ticket(id: u64) -> RunTicket {
        RunTicket {
            id,
            document: "{}".into(),
            out_file: PathBuf::from("definitely/missing.bin"),
        }
    }

    #[test]
    fn test_forwards_stdout_and_completes() {
        let bus = EventBus::new();
        let log = bus.subscribe(SIMULATION_LOG);
        let finished = bus.subscribe(SIMULATION_FINISHED);

        let mut solver = ProcessSolver::new("sh", bus.clone()).with_args([
            "-c",
            r#"cat > /dev/null; echo '{"kind":"LogInfo","data":"started"}'; echo plain"#,
        ]);
        solver.run_simulation(ticket(1)).unwrap();

        let done = wait_finished(&finished);
        assert_eq!(done.run_id, 1);
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.snapshot, None);

        let lines = log.drain();
        assert_eq!(lines[0], json!({ "kind": "LogInfo", "data": "started" }));
        assert_eq!(lines[1], json!({ "kind": "LogInfo", "data": "plain" }));
    }

    #[test]
    fn test_reports_snapshot_written_by_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.bin");
        let bus = EventBus::new();
        let finished = bus.subscribe(SIMULATION_FINISHED);

        let mut solver = ProcessSolver::new("sh", bus.clone()).with_args([
            "-c",
            r#"cat > /dev/null; printf x > "$0""#,
            out.to_str().unwrap(),
        ]);
        solver
            .run_simulation(RunTicket {
                out_file: out.clone(),
                ..ticket(4)
            })
            .unwrap();

        let done = wait_finished(&finished);
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.snapshot, Some(out));
    }

    #[test]
    fn test_leftover_snapshot_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.bin");
        std::fs::write(&out, b"from an earlier run").unwrap();
        let bus = EventBus::new();
        let finished = bus.subscribe(SIMULATION_FINISHED);

        let mut solver = ProcessSolver::new("sh", bus.clone()).with_args(["-c", "cat > /dev/null"]);
        solver
            .run_simulation(RunTicket {
                out_file: out.clone(),
                ..ticket(5)
            })
            .unwrap();

        let done = wait_finished(&finished);
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.snapshot, None);
        assert!(out.is_file());
    }

    #[test]
    fn test_overwritten_snapshot_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.bin");
        std::fs::write(&out, b"old").unwrap();
        let bus = EventBus::new();
        let finished = bus.subscribe(SIMULATION_FINISHED);

        // Sleep past coarse filesystem timestamp granularity.
        let mut solver = ProcessSolver::new("sh", bus.clone()).with_args([
            "-c",
            r#"cat > /dev/null; sleep 1; printf new > "$0""#,
            out.to_str().unwrap(),
        ]);
        solver
            .run_simulation(RunTicket {
                out_file: out.clone(),
                ..ticket(6)
            })
            .unwrap();

        assert_eq!(wait_finished(&finished).snapshot, Some(out));
    }

    #[test]
    fn test_stop_kills_solver() {
        let bus = EventBus::new();
        let finished = bus.subscribe(SIMULATION_FINISHED);

        let mut solver =
            ProcessSolver::new("sh", bus.clone()).with_args(["-c", "cat > /dev/null; exec sleep 30"]);
        solver.run_simulation(ticket(2)).unwrap();
        bus.emit(SIMULATION_STOP, &()).unwrap();

        assert_eq!(wait_finished(&finished).status, RunStatus::Cancelled);
    }

    #[test]
    fn test_missing_executable() {
        let mut solver = ProcessSolver::new("/nonexistent/terra-solver", EventBus::new());
        assert!(matches!(
            solver.run_simulation(ticket(3)),
            Err(SolverError::Spawn { .. })
        ));
    }
}
