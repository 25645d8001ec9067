//! Logger setup for the `rigctl` binary.
//!
//! The library only emits through the `log` facade; this installs a `fern`
//! dispatcher that writes `[elapsed LEVEL] target: message` lines to stdout.

use std::time::Instant;

use log::LevelFilter;
use thiserror::Error;

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    /// A logger was already installed.
    #[error("An error occurred while setting up the logger: {0}")]
    Fern(#[from] log::SetLoggerError),
}

/// Install the global logger.
///
/// Must only be called once per process.
pub fn init(level: LevelFilter) -> Result<(), LoggerInitError> {
    let start = Instant::now();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:10.3} {:5}] {}: {}",
                start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
