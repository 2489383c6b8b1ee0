//! Display subsystem trait.
//!
//! Abstracts the platform's mode enumeration and switching so the catalog
//! and watchdog logic stay pure and testable.

use crate::error::DisplayResult;
use crate::mode::{DisplayId, DisplayMode};
use std::sync::Arc;

/// The host's API for enumerating and switching a display's output mode.
pub trait DisplaySubsystem: Send + Sync {
    /// Identifier of the primary display, if one is attached.
    fn primary_display(&self) -> Option<DisplayId>;

    /// The mode the display is currently presenting.
    fn current_mode(&self, display: DisplayId) -> Option<DisplayMode>;

    /// Every native mode of the display, including the duplicate
    /// low-resolution variants the OS hides from its default list.
    fn all_modes(&self, display: DisplayId) -> Vec<DisplayMode>;

    /// Switch the display to `mode`.
    fn set_mode(&self, display: DisplayId, mode: &DisplayMode) -> DisplayResult<()>;
}

impl<T: DisplaySubsystem + ?Sized> DisplaySubsystem for Arc<T> {
    fn primary_display(&self) -> Option<DisplayId> {
        (**self).primary_display()
    }

    fn current_mode(&self, display: DisplayId) -> Option<DisplayMode> {
        (**self).current_mode(display)
    }

    fn all_modes(&self, display: DisplayId) -> Vec<DisplayMode> {
        (**self).all_modes(display)
    }

    fn set_mode(&self, display: DisplayId, mode: &DisplayMode) -> DisplayResult<()> {
        (**self).set_mode(display, mode)
    }
}

/// Null implementation for unsupported platforms: there is never a display.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl DisplaySubsystem for NullDisplay {
    fn primary_display(&self) -> Option<DisplayId> {
        None
    }

    fn current_mode(&self, _display: DisplayId) -> Option<DisplayMode> {
        None
    }

    fn all_modes(&self, _display: DisplayId) -> Vec<DisplayMode> {
        Vec::new()
    }

    fn set_mode(&self, _display: DisplayId, _mode: &DisplayMode) -> DisplayResult<()> {
        Err(crate::error::DisplayError::Unavailable)
    }
}
