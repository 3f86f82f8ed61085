use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Send tracing output to `log_file`; the terminal belongs to the UI.
/// The filter comes from RUST_LOG and defaults to `info`.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .context("log file path has no file name")?;

    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let file_appender = rolling::never(directory, file_name);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(path = %log_file.display(), "Tracing initialized");
    Ok(())
}
