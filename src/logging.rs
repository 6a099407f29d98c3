//! Tracing setup.
//!
//! The TUI owns stdout, so log records only go to a file. Verbosity comes
//! from `RUST_LOG` (default `info`), e.g. `RUST_LOG=userdir=debug`.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, anyhow};
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Install the global subscriber writing to `log_file`. Without a file,
/// logging stays disabled.
pub fn setup_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install tracing subscriber: {e}"))
}
