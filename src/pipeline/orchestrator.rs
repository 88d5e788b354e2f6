//! Sequential step execution.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, StagehandError};
use crate::progress::{PercentTriggers, PhaseRules, ProgressTracker};
use crate::shell::{CommandOutcome, CommandRunner};
use crate::ui::{ProgressSession, ProgressSink};

use super::result::PipelineResult;
use super::step::{StepDescriptor, StepMode, StepResult};

/// Label shown on the overall progress display when none is set.
pub const DEFAULT_LABEL: &str = "Overall progress";

/// Request to stop a pipeline between steps.
///
/// Cloning shares the flag; any clone may cancel.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// An ordered list of steps run as one operation.
///
/// Steps run strictly one after another. A failing optional step is
/// recorded and the run continues; a failing required step ends the run
/// and no later step is attempted.
#[derive(Debug, Clone)]
pub struct Pipeline {
    label: String,
    steps: Vec<StepDescriptor>,
    rules: PhaseRules,
    triggers: PercentTriggers,
}

impl Pipeline {
    /// Build a pipeline. Fails on an empty list or duplicate/blank names.
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self> {
        if steps.is_empty() {
            return Err(StagehandError::InvalidPipeline {
                message: "pipeline has no steps".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (index, step) in steps.iter().enumerate() {
            if step.name.trim().is_empty() {
                return Err(StagehandError::InvalidPipeline {
                    message: format!("step {} has an empty name", index + 1),
                });
            }
            if !seen.insert(step.name.as_str()) {
                return Err(StagehandError::InvalidPipeline {
                    message: format!("duplicate step name '{}'", step.name),
                });
            }
        }

        let rules = PhaseRules::default();
        let triggers = PercentTriggers::from_rules(&rules);
        Ok(Self {
            label: DEFAULT_LABEL.to_string(),
            steps,
            rules,
            triggers,
        })
    }

    /// Replace the overall progress label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the phase rules used by live steps. Percentage triggers are
    /// re-derived from the new rules.
    pub fn with_phase_rules(mut self, rules: PhaseRules) -> Self {
        self.triggers = PercentTriggers::from_rules(&rules);
        self.rules = rules;
        self
    }

    /// Replace the percentage triggers used by live steps.
    pub fn with_percent_triggers(mut self, triggers: PercentTriggers) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order.
    pub fn run(&self, runner: &dyn CommandRunner, sink: &mut dyn ProgressSink) -> PipelineResult {
        self.run_with_cancel(runner, sink, &CancelToken::new())
    }

    /// Run every step in order, checking `cancel` before each one.
    ///
    /// A cancelled run records the next step as never started and names it
    /// as the failed step.
    pub fn run_with_cancel(
        &self,
        runner: &dyn CommandRunner,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> PipelineResult {
        let total = self.steps.len();
        let mut session = ProgressSession::begin(sink, &self.label, Some(total as u64));
        let mut results = Vec::with_capacity(total);

        tracing::info!(pipeline = %self.label, steps = total, "pipeline started");

        for (index, step) in self.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(step = %step.name, "pipeline cancelled");
                results.push(StepResult::not_started(step));
                return PipelineResult::failed(results, step.name.clone());
            }

            let span = tracing::info_span!("step", name = %step.name, index = index + 1, total);
            let _entered = span.enter();

            session.set_position(index as u64, Some(&step.name));
            tracing::info!(command = %step.command, mode = ?step.mode, "step started");

            let outcome = self.run_step(runner, step, &mut session);

            let duration = outcome.duration();
            let failure = outcome.failure().map(ToString::to_string);
            results.push(StepResult::ran(step, outcome));

            match failure {
                None => tracing::info!(?duration, "step succeeded"),
                Some(reason) if step.optional => {
                    tracing::warn!(%reason, "optional step failed, continuing")
                }
                Some(reason) => {
                    tracing::error!(%reason, "required step failed, stopping pipeline");
                    return PipelineResult::failed(results, step.name.clone());
                }
            }
            session.set_position(index as u64 + 1, None);
        }

        session.complete();
        tracing::info!(pipeline = %self.label, "pipeline finished");
        PipelineResult::completed(results)
    }

    fn run_step(
        &self,
        runner: &dyn CommandRunner,
        step: &StepDescriptor,
        session: &mut ProgressSession<'_>,
    ) -> CommandOutcome {
        match step.mode {
            StepMode::Await => runner.run(&step.command),
            StepMode::Live => {
                let mut tracker = ProgressTracker::new(self.rules.clone(), self.triggers.clone());
                let outcome = runner.run_live(&step.command, &mut |line: &str| {
                    if let Some(event) = tracker.observe(line) {
                        session.detail(&event);
                    }
                });
                if let Some(event) = tracker.finish() {
                    session.detail(&event);
                }
                outcome
            }
        }
    }
}
