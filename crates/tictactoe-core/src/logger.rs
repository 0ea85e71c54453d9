//! Stderr logger for the detection pipeline.
//!
//! Records print as `[   0.012s  INFO blob] message`: time since the logger
//! was installed, level, and the last segment of the emitting module path.
//! Install it once with [`init_with_level`].

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

static STARTED: OnceLock<Instant> = OnceLock::new();
static INSTALLED: OnceLock<()> = OnceLock::new();
static LOGGER: PipelineLogger = PipelineLogger;

struct PipelineLogger;

fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_line(elapsed: f64, level: log::Level, target: &str, args: impl fmt::Display) -> String {
    format!(
        "[{elapsed:8.3}s {level:>5} {}] {args}",
        short_target(target)
    )
}

impl Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = STARTED.get_or_init(Instant::now).elapsed().as_secs_f64();
        let line = format_line(elapsed, record.level(), record.target(), record.args());
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install the stderr logger with the provided level filter.
///
/// Later calls only change the level.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    if INSTALLED.get().is_none() {
        STARTED.get_or_init(Instant::now);
        log::set_logger(&LOGGER)?;
        let _ = INSTALLED.set(());
    }
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber that reports span timings on close.
///
/// The filter comes from `RUST_LOG` and falls back to `info`; `json` selects
/// one JSON object per event.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_time_level_and_module() {
        let line = format_line(0.0126, log::Level::Info, "tictactoe_board::blob", "3 blobs");
        assert_eq!(line, "[   0.013s  INFO blob] 3 blobs");
    }

    #[test]
    fn installing_twice_only_updates_the_level() {
        init_with_level(LevelFilter::Debug).expect("first install");
        init_with_level(LevelFilter::Warn).expect("second install");
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
