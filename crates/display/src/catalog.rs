//! Mode catalog: the display's modes that share the current aspect ratio.

use crate::error::{DisplayError, DisplayResult};
use crate::mode::{DisplayId, DisplayMode, Resolution};
use crate::provider::DisplaySubsystem;

/// Whether `mode` is proportionally equivalent to `reference`.
///
/// Integer cross-multiplication, widened to `u64` so no ratio is ever
/// rounded and no product can overflow.
pub fn same_aspect(mode: &DisplayMode, reference: &DisplayMode) -> bool {
    u64::from(mode.width) * u64::from(reference.height)
        == u64::from(mode.height) * u64::from(reference.width)
}

/// First mode with exactly the given dimensions.
pub fn select_mode(modes: &[DisplayMode], width: u32, height: u32) -> Option<&DisplayMode> {
    modes.iter().find(|mode| mode.matches(width, height))
}

/// Modes of one display filtered to the aspect class of its current mode.
///
/// Invariant: `current` is always a member of `modes`.
#[derive(Debug, Clone)]
pub struct ModeCatalog {
    display: DisplayId,
    current: DisplayMode,
    modes: Vec<DisplayMode>,
}

impl ModeCatalog {
    /// Build a catalog from a display's full mode list.
    pub fn from_modes(display: DisplayId, current: DisplayMode, all_modes: Vec<DisplayMode>) -> Self {
        let mut modes: Vec<DisplayMode> = all_modes
            .into_iter()
            .filter(|mode| same_aspect(mode, &current))
            .collect();

        if !modes.contains(&current) {
            tracing::debug!(mode = %current, "current mode missing from mode list, adding it");
            modes.push(current.clone());
        }

        Self {
            display,
            current,
            modes,
        }
    }

    pub fn display(&self) -> DisplayId {
        self.display
    }

    /// The mode the display presented when the catalog was resolved.
    pub fn current(&self) -> &DisplayMode {
        &self.current
    }

    /// Catalog entries in native order.
    pub fn modes(&self) -> &[DisplayMode] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn is_current(&self, mode: &DisplayMode) -> bool {
        *mode == self.current
    }

    pub fn select(&self, resolution: Resolution) -> Option<&DisplayMode> {
        select_mode(&self.modes, resolution.width, resolution.height)
    }

    /// Entries ascending by width; entries of equal width keep native order.
    pub fn sorted_by_width(&self) -> Vec<&DisplayMode> {
        let mut sorted: Vec<&DisplayMode> = self.modes.iter().collect();
        sorted.sort_by_key(|mode| mode.width);
        sorted
    }

    /// One line per mode, current mode marked with `*`.
    pub fn listing(&self) -> String {
        self.sorted_by_width()
            .into_iter()
            .map(|mode| {
                let marker = if self.is_current(mode) { '*' } else { ' ' };
                format!("{} {}\n", marker, mode)
            })
            .collect()
    }
}

/// Query the primary display and build its aspect-matched catalog.
pub fn resolve_catalog<D>(display: &D) -> DisplayResult<ModeCatalog>
where
    D: DisplaySubsystem + ?Sized,
{
    let id = display.primary_display().ok_or(DisplayError::Unavailable)?;
    let current = display.current_mode(id).ok_or(DisplayError::Unavailable)?;
    let all_modes = display.all_modes(id);
    let total = all_modes.len();

    let catalog = ModeCatalog::from_modes(id, current, all_modes);

    tracing::debug!(
        display = %id,
        current = %catalog.current(),
        total,
        matching = catalog.len(),
        "resolved mode catalog"
    );

    Ok(catalog)
}
