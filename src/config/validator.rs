//! Pipeline file validation rules.
//!
//! This module validates a parsed pipeline file for correctness:
//! - There must be at least one step
//! - Step names must be present and unique
//! - Every step needs a non-empty command; `shell` requires a string
//! - Timeouts must lie within the range the runner accepts
//! - Phase rules and percentage triggers must be well formed

use std::collections::HashSet;
use std::time::Duration;

use crate::config::schema::{CommandConfig, PercentTriggersConfig, PipelineConfig, ANY_TRIGGER};
use crate::error::{Result, StagehandError};
use crate::shell::MAX_TIMEOUT;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step name if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, step: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: step.map(str::to_string),
        }
    }
}

/// Validate a pipeline file and return all errors.
///
/// All problems are collected rather than stopping at the first one, so
/// several mistakes can be fixed in one edit.
pub fn validate_config(config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_settings(config));
    errors.extend(validate_steps(config));
    errors.extend(validate_progress_rules(config));

    errors
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &PipelineConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(StagehandError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

fn validate_settings(config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(secs) = config.settings.default_timeout {
        if !timeout_in_range(secs) {
            errors.push(ValidationError::new(
                "invalid-timeout",
                format!(
                    "settings.default_timeout must be between 1 and {} seconds, got {}",
                    MAX_TIMEOUT.as_secs(),
                    secs
                ),
                None,
            ));
        }
    }

    errors
}

fn validate_steps(config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.steps.is_empty() {
        errors.push(ValidationError::new(
            "no-steps",
            "Pipeline must define at least one step".to_string(),
            None,
        ));
        return errors;
    }

    let mut seen = HashSet::new();
    for (index, step) in config.steps.iter().enumerate() {
        let name = step.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                "missing-name",
                format!("Step {} has no name", index + 1),
                None,
            ));
        } else if !seen.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-name",
                format!("Step name '{}' is used more than once", name),
                Some(name),
            ));
        }

        let label = if name.is_empty() {
            format!("Step {}", index + 1)
        } else {
            format!("Step '{}'", name)
        };
        let step_ref = Some(name).filter(|n| !n.is_empty());

        match &step.command {
            None => errors.push(ValidationError::new(
                "missing-command",
                format!("{} must have a 'command'", label),
                step_ref,
            )),
            Some(CommandConfig::Line(line)) if line.trim().is_empty() => {
                errors.push(ValidationError::new(
                    "empty-command",
                    format!("{} has an empty command", label),
                    step_ref,
                ))
            }
            Some(CommandConfig::Argv(args))
                if args.first().map_or(true, |program| program.trim().is_empty()) =>
            {
                errors.push(ValidationError::new(
                    "empty-command",
                    format!("{} has an empty command list", label),
                    step_ref,
                ))
            }
            Some(CommandConfig::Argv(_)) if step.shell => errors.push(ValidationError::new(
                "shell-needs-string",
                format!("{} sets 'shell' but its command is a list", label),
                step_ref,
            )),
            Some(_) => {}
        }

        if let Some(secs) = step.timeout {
            if !timeout_in_range(secs) {
                errors.push(ValidationError::new(
                    "invalid-timeout",
                    format!(
                        "{} timeout must be between 1 and {} seconds, got {}",
                        label,
                        MAX_TIMEOUT.as_secs(),
                        secs
                    ),
                    step_ref,
                ));
            }
        }
    }

    errors
}

fn validate_progress_rules(config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, rule) in config.phase_rules.iter().flatten().enumerate() {
        if rule.contains.is_empty() || rule.label.trim().is_empty() {
            errors.push(ValidationError::new(
                "invalid-phase-rule",
                format!("Phase rule {} needs both 'contains' and 'label'", index + 1),
                None,
            ));
        }
    }

    match &config.percent_triggers {
        Some(PercentTriggersConfig::Keyword(word)) if word != ANY_TRIGGER => {
            errors.push(ValidationError::new(
                "invalid-percent-triggers",
                format!(
                    "percent_triggers must be '{}' or a list, got '{}'",
                    ANY_TRIGGER, word
                ),
                None,
            ))
        }
        Some(PercentTriggersConfig::List(needles)) if needles.iter().any(String::is_empty) => {
            errors.push(ValidationError::new(
                "invalid-percent-triggers",
                "percent_triggers entries must not be empty".to_string(),
                None,
            ))
        }
        _ => {}
    }

    errors
}

fn timeout_in_range(secs: u64) -> bool {
    secs >= 1 && Duration::from_secs(secs) <= MAX_TIMEOUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PhaseRuleConfig, StepConfig};

    fn step(name: &str, command: &str) -> StepConfig {
        StepConfig {
            name: name.to_string(),
            command: Some(CommandConfig::Line(command.to_string())),
            ..Default::default()
        }
    }

    fn config(steps: Vec<StepConfig>) -> PipelineConfig {
        PipelineConfig {
            steps,
            ..Default::default()
        }
    }

    fn rules(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.rule.as_str()).collect()
    }

    #[test]
    fn valid_config_passes() {
        let config = config(vec![step("update", "apt-get update"), step("clean", "apt-get clean")]);
        assert!(validate_config(&config).is_empty());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn empty_pipeline_fails() {
        let errors = validate_config(&PipelineConfig::default());
        assert_eq!(rules(&errors), vec!["no-steps"]);
    }

    #[test]
    fn duplicate_and_missing_names() {
        let config = config(vec![step("a", "x"), step("a", "y"), step("", "z")]);
        let errors = validate_config(&config);
        assert_eq!(rules(&errors), vec!["duplicate-name", "missing-name"]);
        assert_eq!(errors[0].step.as_deref(), Some("a"));
    }

    #[test]
    fn command_problems() {
        let mut shell_list = step("list", "x");
        shell_list.command = Some(CommandConfig::Argv(vec!["ls".into()]));
        shell_list.shell = true;

        let mut empty_list = step("empty-list", "x");
        empty_list.command = Some(CommandConfig::Argv(vec![]));

        let mut missing = step("missing", "x");
        missing.command = None;

        let config = config(vec![step("blank", "  "), empty_list, missing, shell_list]);
        let errors = validate_config(&config);
        assert_eq!(
            rules(&errors),
            vec![
                "empty-command",
                "empty-command",
                "missing-command",
                "shell-needs-string"
            ]
        );
    }

    #[test]
    fn timeouts_out_of_range() {
        let mut zero = step("zero", "x");
        zero.timeout = Some(0);
        let mut huge = step("huge", "x");
        huge.timeout = Some(MAX_TIMEOUT.as_secs() + 1);

        let mut config = config(vec![zero, huge]);
        config.settings.default_timeout = Some(0);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.rule == "invalid-timeout"));
    }

    #[test]
    fn progress_rule_problems() {
        let mut config = config(vec![step("a", "x")]);
        config.phase_rules = Some(vec![PhaseRuleConfig {
            contains: String::new(),
            label: "Nothing".to_string(),
        }]);
        config.percent_triggers = Some(PercentTriggersConfig::Keyword("all".to_string()));

        let errors = validate_config(&config);
        assert_eq!(
            rules(&errors),
            vec!["invalid-phase-rule", "invalid-percent-triggers"]
        );
    }

    #[test]
    fn validate_joins_messages() {
        let config = config(vec![step("a", ""), step("a", "")]);
        let err = validate(&config).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Step 'a' has an empty command"));
        assert!(text.contains("used more than once"));
        assert!(text.contains("; "));
    }
}
