//! # Profiling
//!
//! With the `profiling` feature, `App::step`, each system run and
//! `ComponentStore::find` open `info_span!`s. These helpers install a
//! subscriber to collect them.
//!
//! ```ignore
//! let _guard = phase_ecs::profiling::init_json_file("logs", "phase_ecs.log")?;
//! app.run()?;
//! ```
//!
//! Use `RUST_LOG=phase_ecs=trace` to see every update.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::{EcsError, Result};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Human-readable spans and events on stdout
pub fn init_stdout() -> Result<()> {
    let subscriber = Registry::default()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| EcsError::LoggingError(err.to_string()))
}

/// JSON lines written to a daily-rotated file in `directory`
///
/// Keep the returned guard alive for as long as events should be flushed.
pub fn init_json_file(directory: impl AsRef<Path>, file_name_prefix: &str) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(directory.as_ref(), file_name_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = Registry::default().with(env_filter()).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| EcsError::LoggingError(err.to_string()))?;
    Ok(guard)
}
