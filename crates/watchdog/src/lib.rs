//! Switch/revert watchdog for switch-res.
//!
//! Applies a requested display mode and keeps it only while a condition
//! holds:
//! - `condition.rs`  - no check, or a shell command judged by exit status
//! - `policy.rs`     - poll interval and quit-on-failure behavior
//! - `controller.rs` - the `Idle → Applied ⇄ Reverted → Stopped` state machine
//!
//! # Example
//!
//! ```ignore
//! use switchres_watchdog::{Condition, PollPolicy, Watchdog};
//! use tokio_util::sync::CancellationToken;
//!
//! let policy = PollPolicy::default()
//!     .with_condition(Condition::Command("pgrep -x game".into()))
//!     .with_quit_on_failure(false);
//!
//! let mut watchdog = Watchdog::new(display, catalog.display(), requested, original, policy);
//! let outcome = watchdog.run(CancellationToken::new()).await?;
//! ```

mod condition;
mod controller;
mod error;
mod policy;

pub use condition::{Condition, CHECK_SHELL};
pub use controller::{RunOutcome, Step, WatchState, Watchdog};
pub use error::{ConditionError, WatchdogError, WatchdogResult};
pub use policy::{PollPolicy, DEFAULT_POLL_INTERVAL};

// Re-export so callers do not need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
