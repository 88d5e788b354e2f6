//! Turning a parsed pipeline file into a runnable [`Pipeline`].

use std::time::Duration;

use crate::config::schema::{
    CommandConfig, PercentTriggersConfig, PipelineConfig, StepConfig, ANY_TRIGGER,
};
use crate::config::validator::validate;
use crate::error::Result;
use crate::pipeline::{Pipeline, StepDescriptor};
use crate::progress::{PercentTriggers, PhaseRule, PhaseRules};
use crate::shell::{CommandSpec, DEFAULT_TIMEOUT};

impl PipelineConfig {
    /// Validate and build the pipeline this file describes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` listing every problem in the file, or
    /// the first `InvalidCommand` a step's command produces.
    pub fn into_pipeline(self) -> Result<Pipeline> {
        validate(&self)?;

        let default_timeout = self
            .settings
            .default_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let steps = self
            .steps
            .into_iter()
            .map(|step| step.into_descriptor(default_timeout))
            .collect::<Result<Vec<_>>>()?;

        let mut pipeline = Pipeline::new(steps)?;
        if let Some(name) = self.name {
            pipeline = pipeline.with_label(name);
        }
        if let Some(rules) = self.phase_rules {
            let rules = rules
                .into_iter()
                .map(|r| PhaseRule::new(r.contains, r.label))
                .collect();
            pipeline = pipeline.with_phase_rules(PhaseRules::new(rules));
        }
        match self.percent_triggers {
            Some(PercentTriggersConfig::Keyword(word)) if word == ANY_TRIGGER => {
                pipeline = pipeline.with_percent_triggers(PercentTriggers::any());
            }
            Some(PercentTriggersConfig::List(needles)) => {
                pipeline = pipeline.with_percent_triggers(PercentTriggers::only(needles));
            }
            _ => {}
        }

        Ok(pipeline)
    }
}

impl StepConfig {
    fn into_descriptor(self, default_timeout: Duration) -> Result<StepDescriptor> {
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(default_timeout);

        let mut command = match self.command {
            Some(CommandConfig::Argv(args)) => CommandSpec::argv(args)?,
            Some(CommandConfig::Line(line)) => CommandSpec::parse(&line, self.shell)?,
            None => CommandSpec::argv(Vec::<String>::new())?,
        }
        .with_timeout(timeout)?;
        if let Some(cwd) = self.cwd {
            command = command.with_cwd(cwd);
        }
        for (key, value) in self.env {
            command = command.with_env(key, value);
        }

        let mut step = if self.optional {
            StepDescriptor::optional(self.name, command)
        } else {
            StepDescriptor::required(self.name, command)
        };
        if self.live {
            step = step.live();
        }
        Ok(step)
    }
}
