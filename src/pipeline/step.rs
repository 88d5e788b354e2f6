//! Step descriptors and per-step results.

use serde::Serialize;

use crate::shell::{CommandOutcome, CommandSpec};

/// How a step's output is consumed while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Buffer output and wait for exit.
    #[default]
    Await,
    /// Parse output line by line for live progress.
    Live,
}

/// One entry in a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Display name; unique within a pipeline.
    pub name: String,
    /// What to run.
    pub command: CommandSpec,
    /// Whether a failure of this step is recorded but tolerated.
    pub optional: bool,
    /// How output is consumed.
    pub mode: StepMode,
}

impl StepDescriptor {
    /// A step whose failure stops the pipeline.
    pub fn required(name: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            name: name.into(),
            command,
            optional: false,
            mode: StepMode::Await,
        }
    }

    /// A step whose failure is recorded and skipped over.
    pub fn optional(name: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            optional: true,
            ..Self::required(name, command)
        }
    }

    /// Parse this step's output for live progress.
    pub fn live(mut self) -> Self {
        self.mode = StepMode::Live;
        self
    }

    pub fn is_live(&self) -> bool {
        self.mode == StepMode::Live
    }
}

/// Status of an attempted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// Recorded but never started (the pipeline was cancelled first).
    NotStarted,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
            StepStatus::NotStarted => '○',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::NotStarted => "not started",
        };
        write!(f, "{}", s)
    }
}

/// Result of one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// Step name.
    pub name: String,
    /// Whether the step was optional.
    pub optional: bool,
    /// The command's outcome; `None` if the step never started.
    pub outcome: Option<CommandOutcome>,
}

impl StepResult {
    pub(crate) fn ran(step: &StepDescriptor, outcome: CommandOutcome) -> Self {
        Self {
            name: step.name.clone(),
            optional: step.optional,
            outcome: Some(outcome),
        }
    }

    pub(crate) fn not_started(step: &StepDescriptor) -> Self {
        Self {
            name: step.name.clone(),
            optional: step.optional,
            outcome: None,
        }
    }

    /// Whether the step ran and exited 0.
    pub fn success(&self) -> bool {
        self.outcome.as_ref().is_some_and(CommandOutcome::success)
    }

    pub fn status(&self) -> StepStatus {
        match &self.outcome {
            None => StepStatus::NotStarted,
            Some(outcome) if outcome.success() => StepStatus::Succeeded,
            Some(_) => StepStatus::Failed,
        }
    }
}
