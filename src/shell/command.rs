//! Command specifications.
//!
//! A [`CommandSpec`] is the unit of work handed to the runner. It is
//! validated on construction and immutable afterwards: the only way to
//! change one is to build a new value through the `with_*` methods.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StagehandError};

/// Timeout applied when a spec does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Upper bound accepted for a single command's timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// How the process is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Program plus arguments, executed directly. No shell is involved.
    Argv(Vec<String>),

    /// A single string handed to the platform shell. The caller is
    /// responsible for quoting anything interpolated into it.
    Shell(String),
}

/// An executable invocation with its timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    invocation: Invocation,
    timeout: Duration,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Build a direct (non-shell) invocation.
    pub fn argv<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match args.first() {
            None => Err(invalid("argument vector is empty")),
            Some(program) if program.trim().is_empty() => Err(invalid("program name is empty")),
            Some(_) => Ok(Self::from_invocation(Invocation::Argv(args))),
        }
    }

    /// Build a shell-interpreted invocation.
    pub fn shell(script: impl Into<String>) -> Result<Self> {
        let script = script.into();
        if script.trim().is_empty() {
            return Err(invalid("shell command is empty"));
        }
        Ok(Self::from_invocation(Invocation::Shell(script)))
    }

    /// Build from a command string.
    ///
    /// With `shell == false` the string is split on whitespace into an
    /// argument vector; no quoting rules are applied.
    pub fn parse(command: &str, shell: bool) -> Result<Self> {
        if shell {
            Self::shell(command)
        } else {
            Self::argv(command.split_whitespace())
        }
    }

    fn from_invocation(invocation: Invocation) -> Self {
        Self {
            invocation,
            timeout: DEFAULT_TIMEOUT,
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Replace the timeout. Must be between one second and [`MAX_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout < Duration::from_secs(1) {
            return Err(invalid("timeout must be at least one second"));
        }
        if timeout > MAX_TIMEOUT {
            return Err(invalid(format!(
                "timeout of {}s exceeds the {}s limit",
                timeout.as_secs(),
                MAX_TIMEOUT.as_secs()
            )));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Run the process in `cwd` instead of the current directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add an environment variable on top of the inherited environment.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Whether this spec goes through the shell.
    pub fn is_shell(&self) -> bool {
        matches!(self.invocation, Invocation::Shell(_))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.invocation {
            Invocation::Argv(args) => write!(f, "{}", args.join(" ")),
            Invocation::Shell(script) => write!(f, "{}", script),
        }
    }
}

fn invalid(message: impl Into<String>) -> StagehandError {
    StagehandError::InvalidCommand {
        message: message.into(),
    }
}
