//! Poll policy for the watchdog loop.

use crate::condition::{Condition, CHECK_SHELL};
use std::time::Duration;

/// Default time between condition checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How the watchdog polls and reacts to a failing condition.
///
/// Assembled once from input and never changed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between ticks.
    pub interval: Duration,

    /// Stop at the first failing check instead of reverting and watching on.
    pub quit_on_failure: bool,

    /// What keeps the requested mode applied.
    pub condition: Condition,

    /// Shell that runs the check command.
    pub shell: String,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            quit_on_failure: true,
            condition: Condition::Always,
            shell: CHECK_SHELL.to_string(),
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_quit_on_failure(mut self, quit_on_failure: bool) -> Self {
        self.quit_on_failure = quit_on_failure;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}
