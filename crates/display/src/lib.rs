//! Display mode handling for switch-res.
//!
//! This crate knows how to talk to the host's display subsystem and how to
//! turn its raw mode list into something the watchdog can act on:
//! - Querying the primary display and its current mode
//! - Building the aspect-matched mode catalog
//! - Selecting a catalog entry for a requested resolution
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  mode.rs     - DisplayMode, ModeId, Resolution (pure)        │
//! │  catalog.rs  - Aspect filter, ordering, selection (pure)     │
//! │  provider.rs - DisplaySubsystem trait                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  platform/macos.rs - CoreGraphics implementation            │
//! │  platform/x11.rs   - RandR implementation                   │
//! │  memory.rs         - In-memory display for tests            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use switchres_display::{platform::PlatformDisplay, resolve_catalog, Resolution};
//!
//! let display = PlatformDisplay::open()?;
//! let catalog = resolve_catalog(&display)?;
//! let wanted: Resolution = "1920x1080".parse()?;
//!
//! match catalog.select(wanted) {
//!     Some(mode) => println!("found {}", mode),
//!     None => print!("{}", catalog.listing()),
//! }
//! ```

mod catalog;
mod error;
mod memory;
mod mode;
mod provider;

pub mod platform;

pub use catalog::{resolve_catalog, same_aspect, select_mode, ModeCatalog};
pub use error::{DisplayError, DisplayResult, ParseResolutionError};
pub use memory::MemoryDisplay;
pub use mode::{DisplayId, DisplayMode, ModeId, Resolution};
pub use provider::{DisplaySubsystem, NullDisplay};
