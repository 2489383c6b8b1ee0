//! Switch/revert controller - the watchdog state machine.

use crate::error::WatchdogResult;
use crate::policy::PollPolicy;
use std::fmt;
use std::sync::Arc;
use switchres_display::{DisplayId, DisplayMode, DisplaySubsystem};
use tokio_util::sync::CancellationToken;

/// Where the watchdog believes the display is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Nothing applied yet; the original mode is active.
    Idle,

    /// The requested mode is active.
    Applied,

    /// The original mode is active and the loop keeps watching.
    Reverted,

    /// Terminal: the loop has exited.
    Stopped,
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WatchState::Idle => "idle",
            WatchState::Applied => "applied",
            WatchState::Reverted => "reverted",
            WatchState::Stopped => "stopped",
        };
        write!(f, "{}", label)
    }
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The requested mode was written to the display.
    Applied,

    /// The original mode was written back to the display.
    Reverted,

    /// Belief already matched the target; nothing was written.
    Unchanged,

    /// The condition failed under a quit-on-failure policy.
    Stopped,
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No condition configured: the mode was applied once.
    Applied,

    /// The condition failed and the policy says to quit.
    ConditionFailed,

    /// Shutdown was requested.
    Shutdown,
}

/// Keeps the requested mode applied while the condition holds.
///
/// The display is the source of truth; `state` is a cached belief kept in
/// sync by issuing exactly one `set_mode` per transition and only flipping
/// the state after that call succeeds.
pub struct Watchdog<D: DisplaySubsystem> {
    display: Arc<D>,
    display_id: DisplayId,
    requested: DisplayMode,
    original: DisplayMode,
    policy: PollPolicy,
    state: WatchState,
    ticks: u64,
}

impl<D: DisplaySubsystem> Watchdog<D> {
    /// `original` must be what the display reported as current before any
    /// switch; the watchdog starts `Idle`.
    pub fn new(
        display: Arc<D>,
        display_id: DisplayId,
        requested: DisplayMode,
        original: DisplayMode,
        policy: PollPolicy,
    ) -> Self {
        Self {
            display,
            display_id,
            requested,
            original,
            policy,
            state: WatchState::Idle,
            ticks: 0,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn is_applied(&self) -> bool {
        self.state == WatchState::Applied
    }

    /// Number of ticks evaluated by `run` so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply one transition for an already-evaluated condition.
    ///
    /// A failed display write is returned as an error and leaves the state
    /// unchanged.
    pub fn step(&mut self, condition_holds: bool) -> WatchdogResult<Step> {
        if self.state == WatchState::Stopped {
            return Ok(Step::Stopped);
        }

        if condition_holds {
            if self.state == WatchState::Applied {
                return Ok(Step::Unchanged);
            }

            self.display.set_mode(self.display_id, &self.requested)?;
            self.state = WatchState::Applied;
            tracing::info!(mode = %self.requested, "applied requested mode");
            return Ok(Step::Applied);
        }

        if self.policy.quit_on_failure {
            // The requested mode, if applied, stays in place
            self.state = WatchState::Stopped;
            tracing::info!("check failed, stopping");
            return Ok(Step::Stopped);
        }

        match self.state {
            WatchState::Applied => {
                self.display.set_mode(self.display_id, &self.original)?;
                self.state = WatchState::Reverted;
                tracing::info!(mode = %self.original, "check failed, reverted to original mode");
                Ok(Step::Reverted)
            }
            WatchState::Idle => {
                // Original mode is still active, nothing to write
                self.state = WatchState::Reverted;
                Ok(Step::Unchanged)
            }
            WatchState::Reverted | WatchState::Stopped => Ok(Step::Unchanged),
        }
    }

    /// Evaluate the condition and apply the resulting transition.
    pub async fn tick(&mut self) -> WatchdogResult<Step> {
        let holds = self.check().await;
        self.advance(holds)
    }

    /// A check that cannot be run counts as failed.
    async fn check(&self) -> bool {
        match self.policy.condition.evaluate_in(&self.policy.shell).await {
            Ok(holds) => holds,
            Err(err) => {
                tracing::warn!(error = %err, "check could not be run, treating as failed");
                false
            }
        }
    }

    fn advance(&mut self, holds: bool) -> WatchdogResult<Step> {
        self.ticks += 1;
        let step = self.step(holds)?;
        tracing::debug!(tick = self.ticks, holds, state = %self.state, ?step, "tick");
        Ok(step)
    }

    /// Drive the evaluate → transition → sleep loop.
    ///
    /// Without a condition the mode is applied once and the call returns.
    /// Otherwise it returns when the condition fails under a quit-on-failure
    /// policy, on the first failed display write, or as soon as `shutdown`
    /// is cancelled. A check still running at that point is killed and its
    /// result discarded, so no display write follows a shutdown request.
    pub async fn run(&mut self, shutdown: CancellationToken) -> WatchdogResult<RunOutcome> {
        if !self.policy.condition.is_watched() {
            self.step(true)?;
            return Ok(RunOutcome::Applied);
        }

        tracing::info!(
            check = %self.policy.condition,
            interval = ?self.policy.interval,
            quit_on_failure = self.policy.quit_on_failure,
            "watching"
        );

        loop {
            if shutdown.is_cancelled() {
                return Ok(self.shut_down());
            }

            let holds = tokio::select! {
                _ = shutdown.cancelled() => None,
                holds = self.check() => Some(holds),
            };
            let Some(holds) = holds.filter(|_| !shutdown.is_cancelled()) else {
                return Ok(self.shut_down());
            };

            if self.advance(holds)? == Step::Stopped {
                return Ok(RunOutcome::ConditionFailed);
            }

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(self.shut_down()),
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }

    fn shut_down(&mut self) -> RunOutcome {
        tracing::info!(state = %self.state, "shutdown requested, leaving display as is");
        self.state = WatchState::Stopped;
        RunOutcome::Shutdown
    }
}
