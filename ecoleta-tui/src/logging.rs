use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a file logger. The terminal itself is owned by the UI.
///
/// `RUST_LOG` takes precedence over the configured level. Keep the returned
/// guard alive until shutdown so buffered lines get flushed.
pub(crate) fn init(config: &Config) -> Result<WorkerGuard> {
    let directory = config
        .log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .ok_or_else(|| anyhow!("log file {} has no file name", config.log_file.display()))?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_unset) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level {:?}", config.log_level))?,
    };

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|err| anyhow!("failed to install logger: {err}"))?;

    Ok(guard)
}
