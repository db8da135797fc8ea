//! Terra Simulation Runner
//!
//! Runs one simulation without the editor and streams the normalized log to
//! stdout. Designed for scripting and batch use.
//!
//! Usage: `terra-runner [config.json] --solver path/to/solver`

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use terra::prelude::*;
use terra_editor::logging;
use terra_editor::settings::{load_config, SolverSettings};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(name = "terra-runner", version, about = "Run a Terra simulation headless")]
struct Cli {
    /// Configuration file; defaults are used when omitted.
    config: Option<PathBuf>,

    /// Stop the run after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(flatten)]
    settings: SolverSettings,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.settings.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };

    let bus = EventBus::new();
    let mut store = Store::with_config(config);
    let mut pipeline = LogPipeline::attach(&bus);
    let mut controller = RunController::new(&bus);
    let mut solver = cli.settings.solver(&bus);

    if let Err(e) = controller.run(&mut store, &mut solver) {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    let deadline = cli.timeout.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut printed = 0;

    let finished = loop {
        pipeline.pump(&mut store);
        printed = print_new_lines(&store, printed);

        if let Some(finished) = controller.poll(&mut store) {
            break Some(finished);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!("Timeout reached, stopping run");
            if let Err(e) = controller.stop(&mut store) {
                log::error!("{e}");
            }
            break None;
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    // Late lines emitted just before the completion signal
    pipeline.pump(&mut store);
    print_new_lines(&store, printed);

    match finished.map(|f| (f.status, f.snapshot)) {
        Some((RunStatus::Completed, snapshot)) => {
            if let Some(path) = snapshot {
                match load_particle_state(&path) {
                    Ok(state) => log::info!(
                        "Result: {} particles at step {} (t = {:.6}) in {}",
                        state.len(),
                        state.step,
                        state.time,
                        path.display()
                    ),
                    Err(e) => log::warn!("{e}"),
                }
            }
            ExitCode::SUCCESS
        }
        Some((RunStatus::Failed(reason), _)) => {
            log::error!("Run failed: {reason}");
            ExitCode::FAILURE
        }
        Some((RunStatus::Cancelled, _)) | None => ExitCode::from(2),
    }
}

fn print_new_lines(store: &Store, printed: usize) -> usize {
    let log = &store.runtime().log;
    for line in log.iter().skip(printed) {
        println!("{line}");
    }
    log.len()
}
