//! Terminal logging for the editor and runner.

use chrono::Local;
use log::LevelFilter;
use std::io::Write;

/// Resolve the log level: explicit argument, then `RUST_LOG`, then info.
pub fn resolve_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger. Later calls are ignored.
///
/// Records go to stderr so the runner's stdout carries only log lines from
/// the simulation.
pub fn init(level: Option<&str>) {
    let log_level = resolve_level(level);
    let installed = env_logger::Builder::new()
        .filter_level(log_level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init();
    if installed.is_ok() {
        log::info!("Logger initialized (level: {})", log_level);
    }
}
