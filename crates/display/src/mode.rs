//! Display mode and resolution types.
//!
//! Pure domain types - no I/O, no platform dependencies.

use crate::error::ParseResolutionError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Identifier of a physical display as understood by the platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayId(pub u32);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native identity of a display mode.
///
/// Backends pick the encoding; the only contract is that two modes offered
/// by the same display compare equal iff they are the same native mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModeId(pub u64);

/// A concrete mode the display hardware/driver can present.
///
/// Equality is by native identity only: HiDPI and low-resolution variants
/// can share the same logical `width`/`height`.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayMode {
    pub id: ModeId,

    /// Logical width in points.
    pub width: u32,

    /// Logical height in points.
    pub height: u32,

    /// Backing store width in pixels (equals `width` on non-scaled modes).
    pub pixel_width: u32,

    /// Backing store height in pixels.
    pub pixel_height: u32,

    /// Refresh rate in millihertz, 0 when the backend cannot tell.
    pub refresh_millihertz: u32,
}

impl DisplayMode {
    /// Mode whose pixel size equals its logical size and with unknown refresh.
    pub fn new(id: ModeId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            pixel_width: width,
            pixel_height: height,
            refresh_millihertz: 0,
        }
    }

    pub fn with_pixels(mut self, pixel_width: u32, pixel_height: u32) -> Self {
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self
    }

    pub fn with_refresh_millihertz(mut self, refresh_millihertz: u32) -> Self {
        self.refresh_millihertz = refresh_millihertz;
        self
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl PartialEq for DisplayMode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DisplayMode {}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A requested `WIDTHxHEIGHT` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    /// Accepts exactly `<digits>x<digits>`, e.g. `1920x1080`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseResolutionError::Malformed(token.to_string());

        let (width, height) = token.split_once('x').ok_or_else(malformed)?;
        let width = parse_dimension(width).ok_or_else(malformed)?;
        let height = parse_dimension(height).ok_or_else(malformed)?;

        if width == 0 || height == 0 {
            return Err(ParseResolutionError::ZeroDimension(token.to_string()));
        }

        Ok(Self { width, height })
    }
}

fn parse_dimension(digits: &str) -> Option<u32> {
    // `u32::from_str` also takes a leading '+', which is not a digit
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
