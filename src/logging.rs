use crate::error::GameError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SHADES_LOG";

pub const fn verbosity_to_directive(verbosity: u8) -> &'static str
{
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a file-backed subscriber. Without a log file nothing is installed:
/// the game draws on the terminal in raw mode, so stderr output would tear the screen.
/// `SHADES_LOG` overrides the verbosity-derived filter.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<(), GameError>
{
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| GameError::LogFile {
            path: path.display().to_string(),
            source,
        })?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(verbosity >= 2)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
