//! X11 implementation of the display subsystem via the RandR extension.

use crate::error::{DisplayError, DisplayResult};
use crate::mode::{DisplayId, DisplayMode, ModeId};
use crate::provider::DisplaySubsystem;

use x11rb::connection::Connection;
use x11rb::protocol::randr::{
    self, ConnectionExt as RandrConnectionExt, GetCrtcInfoReply, GetOutputInfoReply,
    GetScreenResourcesCurrentReply, ModeInfo,
};
use x11rb::protocol::xproto::{ConnectionExt as XprotoConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

/// RandR-backed display subsystem.
///
/// A display is a RandR output; its mode is the mode of the CRTC driving it.
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    screen_mm: (u32, u32),
}

impl std::fmt::Debug for X11Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Display").field("root", &self.root).finish()
    }
}

fn connection_error(err: impl std::fmt::Display) -> DisplayError {
    DisplayError::Connection(err.to_string())
}

impl X11Display {
    /// Connect to the X server named by `$DISPLAY`.
    pub fn open() -> DisplayResult<Self> {
        let (conn, screen_num) = RustConnection::connect(None).map_err(connection_error)?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| connection_error("X server reported no screens"))?;
        let root = screen.root;
        let screen_mm = (
            u32::from(screen.width_in_millimeters),
            u32::from(screen.height_in_millimeters),
        );

        let version = conn
            .randr_query_version(1, 5)
            .map_err(connection_error)?
            .reply()
            .map_err(connection_error)?;
        tracing::debug!(
            major = version.major_version,
            minor = version.minor_version,
            "connected to X server with RandR"
        );

        Ok(Self {
            conn,
            root,
            screen_mm,
        })
    }

    fn resources(&self) -> Option<GetScreenResourcesCurrentReply> {
        self.conn
            .randr_get_screen_resources_current(self.root)
            .ok()?
            .reply()
            .ok()
    }

    fn output_info(&self, output: randr::Output, timestamp: u32) -> Option<GetOutputInfoReply> {
        self.conn
            .randr_get_output_info(output, timestamp)
            .ok()?
            .reply()
            .ok()
    }

    fn crtc_info(&self, crtc: randr::Crtc, timestamp: u32) -> Option<GetCrtcInfoReply> {
        self.conn
            .randr_get_crtc_info(crtc, timestamp)
            .ok()?
            .reply()
            .ok()
    }

    /// Connected output currently driven by a CRTC.
    fn is_usable(&self, output: randr::Output, timestamp: u32) -> bool {
        self.output_info(output, timestamp)
            .map(|info| info.connection == randr::Connection::CONNECTED && info.crtc != x11rb::NONE)
            .unwrap_or(false)
    }

    /// Whether any CRTC other than `crtc` is lit.
    fn other_crtcs_active(&self, resources: &GetScreenResourcesCurrentReply, crtc: randr::Crtc) -> bool {
        resources
            .crtcs
            .iter()
            .filter(|&&other| other != crtc)
            .filter_map(|&other| self.crtc_info(other, resources.config_timestamp))
            .any(|info| info.mode != x11rb::NONE)
    }

    /// Resize the root window, keeping its physical DPI.
    fn set_screen_size(&self, width: u16, height: u16) -> DisplayResult<()> {
        let geometry = self
            .conn
            .get_geometry(self.root)
            .map_err(connection_error)?
            .reply()
            .map_err(connection_error)?;
        if geometry.width == width && geometry.height == height {
            return Ok(());
        }

        let scale = |px: u16, old_px: u16, old_mm: u32| -> u32 {
            if old_px == 0 {
                return old_mm;
            }
            (u64::from(px) * u64::from(old_mm) / u64::from(old_px)) as u32
        };
        let mm_width = scale(width, geometry.width, self.screen_mm.0);
        let mm_height = scale(height, geometry.height, self.screen_mm.1);

        self.conn
            .randr_set_screen_size(self.root, width, height, mm_width, mm_height)
            .map_err(connection_error)?
            .check()
            .map_err(|err| DisplayError::SetModeFailed {
                mode: format!("{}x{}", width, height),
                message: format!("screen resize failed: {}", err),
            })?;

        tracing::debug!(width, height, "resized X screen");
        Ok(())
    }
}

fn refresh_millihertz(info: &ModeInfo) -> u32 {
    let total = u64::from(info.htotal) * u64::from(info.vtotal);
    if total == 0 {
        return 0;
    }
    (u64::from(info.dot_clock) * 1000 / total) as u32
}

fn to_display_mode(info: &ModeInfo) -> DisplayMode {
    DisplayMode::new(
        ModeId(u64::from(info.id)),
        u32::from(info.width),
        u32::from(info.height),
    )
    .with_refresh_millihertz(refresh_millihertz(info))
}

/// Screen size needed to show `info` under `rotation`.
fn rotated_size(info: &ModeInfo, rotation: impl Into<u16>) -> (u16, u16) {
    let quarter_turn = u16::from(randr::Rotation::ROTATE90) | u16::from(randr::Rotation::ROTATE270);
    if rotation.into() & quarter_turn != 0 {
        (info.height, info.width)
    } else {
        (info.width, info.height)
    }
}

/// Mode info for `id` if the output can show it.
///
/// The CRTC's active mode counts even when the output does not list it.
fn find_target<'a>(
    modes: &'a [ModeInfo],
    output_modes: &[u32],
    crtc_mode: u32,
    id: ModeId,
) -> Option<&'a ModeInfo> {
    modes.iter().find(|info| {
        u64::from(info.id) == id.0 && (info.id == crtc_mode || output_modes.contains(&info.id))
    })
}

impl DisplaySubsystem for X11Display {
    fn primary_display(&self) -> Option<DisplayId> {
        let resources = self.resources()?;
        let timestamp = resources.config_timestamp;

        let primary = self
            .conn
            .randr_get_output_primary(self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.output)
            .unwrap_or(x11rb::NONE);

        if primary != x11rb::NONE && self.is_usable(primary, timestamp) {
            return Some(DisplayId(primary));
        }

        // No primary output configured: fall back to the first lit one
        resources
            .outputs
            .iter()
            .copied()
            .find(|&output| self.is_usable(output, timestamp))
            .map(DisplayId)
    }

    fn current_mode(&self, display: DisplayId) -> Option<DisplayMode> {
        let resources = self.resources()?;
        let output = self.output_info(display.0, resources.config_timestamp)?;
        if output.crtc == x11rb::NONE {
            return None;
        }

        let crtc = self.crtc_info(output.crtc, resources.config_timestamp)?;
        resources
            .modes
            .iter()
            .find(|info| info.id == crtc.mode)
            .map(to_display_mode)
    }

    fn all_modes(&self, display: DisplayId) -> Vec<DisplayMode> {
        let Some(resources) = self.resources() else {
            return Vec::new();
        };
        let Some(output) = self.output_info(display.0, resources.config_timestamp) else {
            return Vec::new();
        };

        output
            .modes
            .iter()
            .filter_map(|id| resources.modes.iter().find(|info| info.id == *id))
            .map(to_display_mode)
            .collect()
    }

    fn set_mode(&self, id: DisplayId, mode: &DisplayMode) -> DisplayResult<()> {
        let resources = self.resources().ok_or(DisplayError::Unavailable)?;
        let output = self
            .output_info(id.0, resources.config_timestamp)
            .ok_or(DisplayError::Unavailable)?;
        if output.crtc == x11rb::NONE {
            return Err(DisplayError::Unavailable);
        }

        let crtc = self
            .crtc_info(output.crtc, resources.config_timestamp)
            .ok_or(DisplayError::Unavailable)?;

        let target = find_target(&resources.modes, &output.modes, crtc.mode, mode.id).ok_or_else(|| {
            DisplayError::ModeNotAvailable {
                mode: mode.to_string(),
            }
        })?;

        let (width, height) = rotated_size(target, crtc.rotation);
        let sole_crtc = crtc.x == 0 && crtc.y == 0 && !self.other_crtcs_active(&resources, output.crtc);

        // The CRTC must fit inside the screen before it is reconfigured
        let geometry = self
            .conn
            .get_geometry(self.root)
            .map_err(connection_error)?
            .reply()
            .map_err(connection_error)?;
        if width > geometry.width || height > geometry.height {
            self.set_screen_size(width.max(geometry.width), height.max(geometry.height))?;
        }

        let reply = self
            .conn
            .randr_set_crtc_config(
                output.crtc,
                crtc.timestamp,
                resources.config_timestamp,
                crtc.x,
                crtc.y,
                target.id,
                crtc.rotation,
                &crtc.outputs,
            )
            .map_err(connection_error)?
            .reply()
            .map_err(|err| DisplayError::SetModeFailed {
                mode: mode.to_string(),
                message: err.to_string(),
            })?;

        if reply.status != randr::SetConfig::SUCCESS {
            return Err(DisplayError::SetModeFailed {
                mode: mode.to_string(),
                message: format!("RandR returned {:?}", reply.status),
            });
        }

        if sole_crtc {
            self.set_screen_size(width, height)?;
        }

        tracing::debug!(display = %id, mode = %mode, "display mode set");
        Ok(())
    }
}
