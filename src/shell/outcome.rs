//! Command outcome records.

use serde::{Serialize, Serializer};
use std::fmt;
use std::num::NonZeroI32;
use std::time::Duration;

/// Exit code reported when there is no real one: the process timed out,
/// never started, was killed by a signal, or could not be waited on.
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Why a command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// Ran to completion and exited with a non-zero code.
    NonZeroExit { code: NonZeroI32 },

    /// Terminated by a signal it did not handle.
    Signaled { signal: Option<i32> },

    /// Killed after exceeding its timeout.
    TimedOut {
        #[serde(rename = "after_ms", serialize_with = "duration_ms")]
        after: Duration,
    },

    /// The process could not be spawned.
    StartFailure,

    /// Spawned, but waiting on it failed.
    WaitError,
}

impl Failure {
    /// Exit code for this failure, or [`SENTINEL_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::NonZeroExit { code } => code.get(),
            _ => SENTINEL_EXIT_CODE,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::NonZeroExit { code } => write!(f, "exited with code {}", code),
            Failure::Signaled { signal: Some(sig) } => write!(f, "killed by signal {}", sig),
            Failure::Signaled { signal: None } => write!(f, "killed by a signal"),
            Failure::TimedOut { after } => write!(f, "timed out after {}s", after.as_secs()),
            Failure::StartFailure => write!(f, "failed to start"),
            Failure::WaitError => write!(f, "could not be waited on"),
        }
    }
}

/// Success or failure of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
    Failed(Failure),
}

/// Immutable result of running one [`CommandSpec`](super::CommandSpec).
///
/// Success is carried by the status variant, so a successful outcome
/// always has exit code 0 and a failed one never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    status: CommandStatus,
    stdout: String,
    stderr: String,
    #[serde(rename = "duration_ms", serialize_with = "duration_ms")]
    duration: Duration,
}

impl CommandOutcome {
    /// Outcome for a process that exited normally with `code`.
    pub fn exited(code: i32, stdout: String, stderr: String, duration: Duration) -> Self {
        let status = match NonZeroI32::new(code) {
            None => CommandStatus::Success,
            Some(code) => CommandStatus::Failed(Failure::NonZeroExit { code }),
        };
        Self {
            status,
            stdout,
            stderr,
            duration,
        }
    }

    /// Outcome for a process that ended with `failure`.
    pub fn failed(failure: Failure, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            status: CommandStatus::Failed(failure),
            stdout,
            stderr,
            duration,
        }
    }

    /// Outcome for a process that could not be spawned.
    pub fn start_failure(message: impl Into<String>, duration: Duration) -> Self {
        Self::failed(
            Failure::StartFailure,
            String::new(),
            message.into(),
            duration,
        )
    }

    /// Outcome for a process killed at its deadline.
    ///
    /// `stderr` is whatever was captured before the kill; the timeout
    /// message is appended to it.
    pub fn timed_out(after: Duration, stdout: String, mut stderr: String, elapsed: Duration) -> Self {
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!("Command timed out after {}s", after.as_secs()));
        Self::failed(Failure::TimedOut { after }, stdout, stderr, elapsed)
    }

    pub fn status(&self) -> &CommandStatus {
        &self.status
    }

    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        matches!(self.status, CommandStatus::Success)
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.status {
            CommandStatus::Success => None,
            CommandStatus::Failed(failure) => Some(failure),
        }
    }

    /// Process exit code, or [`SENTINEL_EXIT_CODE`] when there is none.
    pub fn exit_code(&self) -> i32 {
        self.failure().map_or(0, Failure::exit_code)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.failure(), Some(Failure::TimedOut { .. }))
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

fn duration_ms<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
