//! Error types for condition evaluation and the watchdog loop.

use switchres_display::DisplayError;
use thiserror::Error;

/// Result type for watchdog operations.
pub type WatchdogResult<T> = Result<T, WatchdogError>;

/// Fatal errors that stop the watchdog.
#[derive(Debug, Error)]
pub enum WatchdogError {
    /// Applying or reverting a mode failed; the cached state is left as it was.
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Errors from running a condition command.
///
/// Never fatal: the watchdog treats them as a failed condition.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The shell could not be spawned or waited on.
    #[error("failed to run check '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
