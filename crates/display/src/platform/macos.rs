//! macOS implementation of the display subsystem via CoreGraphics.

use crate::error::{DisplayError, DisplayResult};
use crate::mode::{DisplayId, DisplayMode, ModeId};
use crate::provider::DisplaySubsystem;

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::{CFString, CFStringRef};
use core_graphics::display::{CGDisplay, CGDisplayMode};

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    static kCGDisplayShowDuplicateLowResolutionModes: CFStringRef;
}

/// CoreGraphics-backed display subsystem.
///
/// Holds no native handles: every query goes back to CoreGraphics, and
/// `set_mode` re-enumerates to find the native `CGDisplayMode` again.
#[derive(Debug, Default)]
pub struct MacOSDisplay;

impl MacOSDisplay {
    pub fn new() -> Self {
        Self
    }

    /// CoreGraphics needs no connection; opening never fails.
    pub fn open() -> DisplayResult<Self> {
        Ok(Self::new())
    }

    /// Native modes including the duplicate low-resolution ones.
    fn native_modes(display: DisplayId) -> Vec<CGDisplayMode> {
        // SAFETY: the key is an immutable CFString constant exported by CoreGraphics
        let key = unsafe { CFString::wrap_under_get_rule(kCGDisplayShowDuplicateLowResolutionModes) };
        let options = CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())]);

        CGDisplayMode::all_display_modes(display.0, options.as_concrete_TypeRef())
            .unwrap_or_default()
    }
}

/// Stable identity of a native mode.
///
/// The IODisplayModeID alone is shared by HiDPI and low-resolution variants
/// on some panels, so the backing pixel size is folded in.
fn mode_id(mode: &CGDisplayMode) -> ModeId {
    let io_id = u64::from(mode.mode_id() as u32);
    let pixels = ((mode.pixel_width() & 0xffff) << 16) | (mode.pixel_height() & 0xffff);
    ModeId((io_id << 32) | pixels)
}

fn to_display_mode(mode: &CGDisplayMode) -> DisplayMode {
    DisplayMode::new(mode_id(mode), mode.width() as u32, mode.height() as u32)
        .with_pixels(mode.pixel_width() as u32, mode.pixel_height() as u32)
        .with_refresh_millihertz((mode.refresh_rate() * 1000.0).round() as u32)
}

impl DisplaySubsystem for MacOSDisplay {
    fn primary_display(&self) -> Option<DisplayId> {
        // CGMainDisplayID returns kCGNullDirectDisplay (0) when nothing is attached
        let main = CGDisplay::main();
        if main.id == 0 {
            return None;
        }
        Some(DisplayId(main.id))
    }

    fn current_mode(&self, display: DisplayId) -> Option<DisplayMode> {
        CGDisplay::new(display.0)
            .display_mode()
            .map(|mode| to_display_mode(&mode))
    }

    fn all_modes(&self, display: DisplayId) -> Vec<DisplayMode> {
        Self::native_modes(display)
            .iter()
            .map(to_display_mode)
            .collect()
    }

    fn set_mode(&self, id: DisplayId, mode: &DisplayMode) -> DisplayResult<()> {
        let native = Self::native_modes(id)
            .into_iter()
            .find(|candidate| mode_id(candidate) == mode.id)
            .ok_or_else(|| DisplayError::ModeNotAvailable {
                mode: mode.to_string(),
            })?;

        CGDisplay::new(id.0)
            .set_display_mode(&native)
            .map_err(|code| DisplayError::SetModeFailed {
                mode: mode.to_string(),
                message: format!("CGDisplaySetDisplayMode returned {}", code),
            })?;

        tracing::debug!(display = %id, mode = %mode, "display mode set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_main_display() {
        // Only meaningful on a machine with a display attached
        let display = MacOSDisplay::new();
        let Some(id) = display.primary_display() else {
            return;
        };

        // Don't assert - the mode list depends on the attached panel
        let current = display.current_mode(id);
        println!("Current mode: {:?}", current);
        println!("Modes: {}", display.all_modes(id).len());
    }
}
