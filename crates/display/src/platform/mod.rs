//! Platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::MacOSDisplay;

#[cfg(all(unix, not(target_os = "macos")))]
mod x11;

#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Display;

// Re-export the appropriate display backend for the current platform
#[cfg(target_os = "macos")]
pub type PlatformDisplay = MacOSDisplay;

#[cfg(all(unix, not(target_os = "macos")))]
pub type PlatformDisplay = X11Display;

#[cfg(not(unix))]
pub type PlatformDisplay = crate::provider::NullDisplay;

#[cfg(not(unix))]
impl crate::provider::NullDisplay {
    pub fn open() -> crate::error::DisplayResult<Self> {
        Ok(Self)
    }
}
