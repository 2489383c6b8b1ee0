//! Error types for display access and resolution parsing.

use thiserror::Error;

/// Result type for display operations.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Errors reported by the display subsystem.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// No usable display, display id or current mode could be obtained.
    #[error("Unable to fetch available display modes")]
    Unavailable,

    /// The platform backend could not be opened (e.g. no X server).
    #[error("failed to connect to display server: {0}")]
    Connection(String),

    /// The requested native mode is no longer offered by the display.
    #[error("display mode {mode} is no longer available")]
    ModeNotAvailable { mode: String },

    /// The display subsystem refused to switch modes.
    #[error("failed to switch display to {mode}: {message}")]
    SetModeFailed { mode: String, message: String },
}

/// Errors from parsing a `WIDTHxHEIGHT` token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseResolutionError {
    #[error("Incorrect resolution: {0}")]
    Malformed(String),

    #[error("Incorrect resolution: {0} (width and height must be positive)")]
    ZeroDimension(String),
}
