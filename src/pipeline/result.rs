//! Aggregate pipeline results.

use serde::Serialize;

use super::step::StepResult;

/// Outcome of a whole pipeline run.
///
/// When `failed_step` is set, `steps` ends with that step and holds
/// nothing after it. When it is absent, `steps` covers every declared step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    success: bool,
    steps: Vec<StepResult>,
    failed_step: Option<String>,
}

impl PipelineResult {
    pub(crate) fn completed(steps: Vec<StepResult>) -> Self {
        Self {
            success: true,
            steps,
            failed_step: None,
        }
    }

    pub(crate) fn failed(steps: Vec<StepResult>, failed_step: String) -> Self {
        Self {
            success: false,
            steps,
            failed_step: Some(failed_step),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Results of every attempted step, in declaration order.
    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    /// Name of the required step that stopped the pipeline.
    pub fn failed_step(&self) -> Option<&str> {
        self.failed_step.as_deref()
    }

    /// Result of the step named by [`failed_step`](Self::failed_step).
    pub fn failed_result(&self) -> Option<&StepResult> {
        let name = self.failed_step.as_deref()?;
        self.steps.iter().rev().find(|s| s.name == name)
    }

    /// Optional steps that ran and failed.
    pub fn optional_failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps
            .iter()
            .filter(|s| s.optional && s.outcome.is_some() && !s.success())
    }

    /// Look up an attempted step by name.
    pub fn step(&self, name: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
