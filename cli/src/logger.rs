//! Provides configuration of a logger.
use env_logger::Builder;
use log::trace;
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Configures the log with the specified verbosity.
///
/// Each level of verbosity adds one log level, starting from errors only.
/// When a log file is given, records go to the file instead of stderr so
/// that they do not mix with diagnostics.
pub fn configure(verbosity: u8, log_file: Option<PathBuf>) -> Result<(), String> {
    let log_level = level_for(verbosity)?;

    let mut builder = Builder::new();

    if let Some(log_location) = log_file {
        let file = File::create(&log_location).map_err(|e| {
            format!(
                "Unable to create log file {}. {}",
                log_location.display(),
                e
            )
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                OffsetDateTime::now_utc(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(log_level)
        .try_init()
        .map_err(|e| format!("Unable to configure logger. {}", e))?;

    trace!("Logger verbosity {log_level}");
    Ok(())
}

fn level_for(verbosity: u8) -> Result<LevelFilter, String> {
    match verbosity {
        0 => Ok(LevelFilter::Error),
        1 => Ok(LevelFilter::Warn),
        2 => Ok(LevelFilter::Info),
        3 => Ok(LevelFilter::Debug),
        4 => Ok(LevelFilter::Trace),
        _ => Err(String::from("Don't be crazy with verbose")),
    }
}
