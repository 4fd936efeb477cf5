//! File logging

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;
use crate::constants::{APP_NAME, APP_VERSION};

/// Install the global subscriber writing to the log file in the config dir.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = config.ensure_dir()?;
    let file_appender = tracing_appender::rolling::never(dir, &config.log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| anyhow!("Cannot install log subscriber: {}", e))?;

    tracing::info!(app = APP_NAME, version = APP_VERSION, "Logging started");
    Ok(guard)
}
