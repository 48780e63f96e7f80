// SPDX-License-Identifier: MIT
//
// Logging setup. The editor owns the terminal, so log records go to a file
// and never to stdout or stderr.

use std::fs;
use std::path::Path;

use anyhow::Context;
use log::LevelFilter;

/// Environment variable that overrides the configured level.
pub const LEVEL_ENV: &str = "MEDA_LOG";

/// The level from `MEDA_LOG` if it is set to a level name, else `configured`.
pub fn effective_level(configured: LevelFilter) -> LevelFilter {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(configured)
}

/// Send `log` records at `level` and above to `path`, appending.
///
/// # Errors
///
/// Fails if the log directory or file cannot be created, or a logger is
/// already installed.
pub fn init(path: &Path, level: LevelFilter) -> anyhow::Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = fern::log_file(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .chain(file)
        .apply()
        .context("installing logger")?;

    log::info!("meda {} started, logging at {level}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_installs_nothing() {
        assert!(init(Path::new("/nonexistent/dir/meda.log"), LevelFilter::Off).is_ok());
    }
}
