//! Logger initialization: timestamped output to stdout, with an
//! optional log file alongside the ledger.

use std::path::Path;

use log::LevelFilter;

/// Install the global logger. Call once at application startup; a
/// second call returns the underlying `SetLoggerError` wrapped in
/// `fern::InitError`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
