//! Minimal stderr backend for the `log` facade.

use std::io::Write;

use anyhow::{anyhow, Result};
use log::{LevelFilter, Log, Metadata, Record};

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(
                stderr,
                "[{:>5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs the stderr logger; `verbose` lowers the threshold to trace.
pub(crate) fn init(verbose: bool) -> Result<()> {
    log::set_logger(&LOGGER).map_err(|error| anyhow!("failed to install logger: {error}"))?;
    log::set_max_level(if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    });
    Ok(())
}
