//! In-memory display subsystem.
//!
//! Holds a fixed mode list and records every `set_mode` call, so callers can
//! assert exactly which writes reached the "hardware".

use crate::error::{DisplayError, DisplayResult};
use crate::mode::{DisplayId, DisplayMode};
use crate::provider::DisplaySubsystem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A display that lives entirely in memory.
#[derive(Debug)]
pub struct MemoryDisplay {
    id: DisplayId,
    modes: Vec<DisplayMode>,
    current: Mutex<DisplayMode>,
    writes: Mutex<Vec<DisplayMode>>,
    reject_writes: AtomicBool,
}

impl MemoryDisplay {
    /// Display offering `modes`, currently presenting `current`.
    ///
    /// `current` does not have to be part of `modes`.
    pub fn new(current: DisplayMode, modes: Vec<DisplayMode>) -> Self {
        Self {
            id: DisplayId(1),
            modes,
            current: Mutex::new(current),
            writes: Mutex::new(Vec::new()),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `set_mode` calls fail (or succeed again).
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Modes passed to successful `set_mode` calls, in order.
    pub fn writes(&self) -> Vec<DisplayMode> {
        self.writes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// The mode currently presented.
    pub fn active_mode(&self) -> Option<DisplayMode> {
        self.current.lock().ok().map(|guard| guard.clone())
    }
}

impl DisplaySubsystem for MemoryDisplay {
    fn primary_display(&self) -> Option<DisplayId> {
        Some(self.id)
    }

    fn current_mode(&self, display: DisplayId) -> Option<DisplayMode> {
        if display != self.id {
            return None;
        }
        self.active_mode()
    }

    fn all_modes(&self, display: DisplayId) -> Vec<DisplayMode> {
        if display != self.id {
            return Vec::new();
        }
        self.modes.clone()
    }

    fn set_mode(&self, id: DisplayId, mode: &DisplayMode) -> DisplayResult<()> {
        if id != self.id {
            return Err(DisplayError::Unavailable);
        }

        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(DisplayError::SetModeFailed {
                mode: mode.to_string(),
                message: "rejected by memory display".to_string(),
            });
        }

        let is_current = self.active_mode().as_ref() == Some(mode);
        if !is_current && !self.modes.contains(mode) {
            return Err(DisplayError::ModeNotAvailable {
                mode: mode.to_string(),
            });
        }

        if let Ok(mut current) = self.current.lock() {
            *current = mode.clone();
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(mode.clone());
        }

        tracing::debug!(display = %id, mode = %mode, "memory display switched");
        Ok(())
    }
}
