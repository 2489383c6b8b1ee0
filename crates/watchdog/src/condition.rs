//! Condition evaluation.
//!
//! A condition is either absent (always holds, checked once) or a shell
//! command whose exit status decides whether the requested mode should stay.

use crate::error::ConditionError;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

/// Shell used to run check commands.
pub const CHECK_SHELL: &str = "/bin/sh";

/// What keeps the requested mode applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Condition {
    /// No check configured: apply once and stop watching.
    #[default]
    Always,

    /// Shell command re-run every tick; exit status 0 means "keep".
    Command(String),
}

impl Condition {
    /// `Always` for `None`, a shell command otherwise.
    pub fn from_script(script: Option<String>) -> Self {
        match script {
            Some(script) => Condition::Command(script),
            None => Condition::Always,
        }
    }

    /// Whether there is anything to watch after the first tick.
    pub fn is_watched(&self) -> bool {
        matches!(self, Condition::Command(_))
    }

    /// Evaluate the condition once, running the command as `<shell> -c`.
    ///
    /// There is no timeout. Dropping the returned future kills the child.
    pub async fn evaluate_in(&self, shell: &str) -> Result<bool, ConditionError> {
        let script = match self {
            Condition::Always => return Ok(true),
            Condition::Command(script) => script,
        };

        let status = Command::new(shell)
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ConditionError::Spawn {
                command: script.clone(),
                source,
            })?;

        tracing::debug!(command = %script, status = ?status.code(), "check finished");
        Ok(status.success())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => write!(f, "(none)"),
            Condition::Command(script) => write!(f, "{}", script),
        }
    }
}
