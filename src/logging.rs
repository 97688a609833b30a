//! Logging setup for Plaza.

use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// The configured log level; `info` when the string is unrecognized.
fn level_from(config: &LoggingConfig) -> Level {
    Level::from_str(&config.level).unwrap_or(Level::INFO)
}

/// Initialize tracing from the `[logging]` config section.
///
/// Console output is always on; a non-empty `file` adds a plain-text
/// copy of the same stream. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from(config).into())
        .from_env_lossy();

    let console = tracing_subscriber::fmt::layer().with_target(true);

    if config.file.is_empty() {
        tracing_subscriber::registry()
            .with(console)
            .with(filter)
            .init();
        return Ok(());
    }

    let path = Path::new(&config.file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::registry()
        .with(
            console
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false),
        )
        .with(filter)
        .init();

    Ok(())
}
